//! Request Commands
//!
//! A request frame is an array of bulk strings. The first element names the
//! command, the rest are its arguments. No argument is interpreted here;
//! the dispatcher owns arity and argument parsing.

use bytes::Bytes;

/// A decoded client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command name exactly as sent (case preserved)
    pub name: Bytes,
    /// Arguments following the name
    pub args: Vec<Bytes>,
}

impl Command {
    pub fn new(name: impl Into<Bytes>, args: Vec<Bytes>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Splits a request array into name and arguments. `None` when empty.
    pub fn from_parts(mut parts: Vec<Bytes>) -> Option<Self> {
        if parts.is_empty() {
            return None;
        }
        let args = parts.split_off(1);
        let name = parts.pop()?;
        Some(Self { name, args })
    }

    /// The command name for logs and error messages.
    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        let command = Command::from_parts(vec![
            Bytes::from("hset"),
            Bytes::from("h"),
            Bytes::from("f"),
            Bytes::from("v"),
        ])
        .unwrap();
        assert_eq!(command.name, Bytes::from("hset"));
        assert_eq!(command.args.len(), 3);
        assert_eq!(command.args[0], Bytes::from("h"));

        assert_eq!(Command::from_parts(vec![]), None);
    }

    #[test]
    fn test_name_only() {
        let command = Command::from_parts(vec![Bytes::from("DBSIZE")]).unwrap();
        assert!(command.args.is_empty());
        assert_eq!(command.name_lossy(), "DBSIZE");
    }
}
