//! Post counting over `blogger list` output.

/// Count listed posts: one per non-blank line of stdout.
pub fn count_listed(stdout: &str) -> u32 {
    stdout.lines().filter(|line| !line.trim().is_empty()).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_output_is_zero() {
        assert_eq!(count_listed(""), 0);
        assert_eq!(count_listed("\n\n  \n"), 0);
    }

    #[test]
    fn counts_non_blank_lines() {
        let stdout = "example post title,http://myblog/1\n\nexample post title,http://myblog/2\n";
        assert_eq!(count_listed(stdout), 2);
    }

    #[test]
    fn last_line_without_newline_counts() {
        assert_eq!(count_listed("example post title"), 1);
    }
}
