//! Positional argument validation for `blogger-matrix run`.

use std::fmt;

/// Validated positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    pub username: String,
    pub blog_name: String,
}

/// The first required positional argument that was absent or empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingArgument {
    Username,
    BlogName,
}

impl MissingArgument {
    pub fn message(self) -> &'static str {
        match self {
            MissingArgument::Username => "You have to provide username as the first parameter",
            MissingArgument::BlogName => "You have to provide blog name as the second parameter",
        }
    }
}

impl fmt::Display for MissingArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Require a username and a blog name, checked in that order.
///
/// An empty string counts as absent.
pub fn validate_args(
    username: Option<&str>,
    blog_name: Option<&str>,
) -> Result<RunArgs, MissingArgument> {
    let username = match username {
        Some(value) if !value.is_empty() => value,
        _ => return Err(MissingArgument::Username),
    };
    let blog_name = match blog_name {
        Some(value) if !value.is_empty() => value,
        _ => return Err(MissingArgument::BlogName),
    };
    Ok(RunArgs {
        username: username.to_string(),
        blog_name: blog_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_arguments() {
        let args = validate_args(Some("alice"), Some("myblog")).expect("valid");
        assert_eq!(args.username, "alice");
        assert_eq!(args.blog_name, "myblog");
    }

    #[test]
    fn username_is_reported_first() {
        let err = validate_args(None, None).expect_err("missing");
        assert_eq!(err, MissingArgument::Username);
        assert_eq!(
            err.to_string(),
            "You have to provide username as the first parameter"
        );
    }

    #[test]
    fn empty_strings_count_as_missing() {
        assert_eq!(
            validate_args(Some(""), Some("myblog")),
            Err(MissingArgument::Username)
        );
        assert_eq!(
            validate_args(Some("alice"), Some("")),
            Err(MissingArgument::BlogName)
        );
    }

    #[test]
    fn missing_blog_name_has_its_own_message() {
        let err = validate_args(Some("alice"), None).expect_err("missing");
        assert_eq!(
            err.message(),
            "You have to provide blog name as the second parameter"
        );
    }
}
