//! Argument vectors for the `blogger` subcommands the matrix drives.
//!
//! These are appended to the configured tool command (e.g. `python google.py`).

use crate::core::types::{Operation, RunConfiguration};

pub const SERVICE: &str = "blogger";

/// `blogger list --title <title> --blog <blog>`
pub fn list(title: &str, blog: &str) -> Vec<String> {
    to_args(&[SERVICE, "list", "--title", title, "--blog", blog])
}

/// `blogger list -u <username> --force-auth --blog <blog>`
pub fn force_auth(username: &str, blog: &str) -> Vec<String> {
    to_args(&[SERVICE, "list", "-u", username, "--force-auth", "--blog", blog])
}

/// `blogger post --title <title> --blog <blog> <body>`
pub fn post(title: &str, blog: &str, body: &str) -> Vec<String> {
    to_args(&[SERVICE, "post", "--title", title, "--blog", blog, body])
}

/// `blogger tag --title <title> --tags "<t1>, <t2>" --blog <blog>`
pub fn tag(title: &str, tags: &[String], blog: &str) -> Vec<String> {
    let tags = join_tags(tags);
    to_args(&[SERVICE, "tag", "--title", title, "--tags", &tags, "--blog", blog])
}

/// `blogger delete --title <title> --blog <blog>`
pub fn delete(title: &str, blog: &str) -> Vec<String> {
    to_args(&[SERVICE, "delete", "--title", title, "--blog", blog])
}

/// Arguments for a mutating step against the run's post.
pub fn mutation(operation: Operation, config: &RunConfiguration) -> Vec<String> {
    match operation {
        Operation::Post => post(&config.post_title, &config.blog_name, &config.post_body),
        Operation::Tag => tag(&config.post_title, &config.tags, &config.blog_name),
        Operation::Delete => delete(&config.post_title, &config.blog_name),
    }
}

pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}

/// Render arguments as a copy-pasteable shell command line.
pub fn render(args: &[String]) -> String {
    args.iter()
        .map(|arg| shell_escape(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_escape(input: &str) -> String {
    if !input.is_empty()
        && input
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':'))
    {
        return input.to_string();
    }
    let mut escaped = String::from("'");
    for ch in input.chars() {
        if ch == '\'' {
            escaped.push_str("'\"'\"'");
        } else {
            escaped.push(ch);
        }
    }
    escaped.push('\'');
    escaped
}

fn to_args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RunConfiguration {
        RunConfiguration {
            username: "alice".to_string(),
            blog_name: "myblog".to_string(),
            post_title: "example post title".to_string(),
            post_body: "example post body".to_string(),
            tags: vec!["tag1".to_string(), "tag2".to_string()],
        }
    }

    #[test]
    fn list_filters_by_title_and_blog() {
        assert_eq!(
            list("example post title", "myblog"),
            vec![
                "blogger",
                "list",
                "--title",
                "example post title",
                "--blog",
                "myblog"
            ]
        );
    }

    #[test]
    fn force_auth_passes_username() {
        let rendered = render(&force_auth("alice", "myblog"));
        assert_eq!(rendered, "blogger list -u alice --force-auth --blog myblog");
    }

    #[test]
    fn tag_joins_tags_in_order() {
        let args = mutation(Operation::Tag, &config());
        assert_eq!(args[5], "tag1, tag2");
        assert_eq!(args[1], "tag");
    }

    #[test]
    fn post_puts_body_last() {
        let args = mutation(Operation::Post, &config());
        assert_eq!(args.last().map(String::as_str), Some("example post body"));
    }

    #[test]
    fn render_quotes_arguments_with_spaces() {
        let rendered = render(&list("it's a title", "myblog"));
        assert_eq!(
            rendered,
            "blogger list --title 'it'\"'\"'s a title' --blog myblog"
        );
    }

    #[test]
    fn render_quotes_empty_arguments() {
        assert_eq!(render(&["".to_string()]), "''");
    }
}
