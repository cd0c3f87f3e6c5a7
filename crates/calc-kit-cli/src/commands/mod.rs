pub mod health;
pub mod investing;
pub mod loan;

use serde::de::DeserializeOwned;

use crate::input;

/// Resolve a calculator input from, in order: the `--input` file, the
/// command-line flags, then JSON piped on stdin.
///
/// `from_flags` returns `Ok(None)` when the required flags were not given.
pub fn load_input<T, F>(
    path: Option<&str>,
    from_flags: F,
    usage: &str,
) -> Result<T, Box<dyn std::error::Error>>
where
    T: DeserializeOwned,
    F: FnOnce() -> Result<Option<T>, Box<dyn std::error::Error>>,
{
    if let Some(path) = path {
        return input::file::read_input(path);
    }
    if let Some(value) = from_flags()? {
        return Ok(value);
    }
    if let Some(value) = input::stdin::read_stdin()? {
        return Ok(value);
    }
    Err(format!("{usage}, --input <file.json|file.yaml>, or JSON on stdin required").into())
}
