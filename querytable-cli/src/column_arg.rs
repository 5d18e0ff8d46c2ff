//! Column declarations given on the command line.

use querytable_lib::format::Format;

/// One `--column` argument: `KEY[=DISPLAY][:FLAG,FLAG...]`.
///
/// Flags are `sortable`, `searchable`, `hidden`, or a format identifier.
/// Formats apply in the order given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnArg {
    pub key: String,
    pub display: Option<String>,
    pub sortable: bool,
    pub searchable: bool,
    pub hidden: bool,
    pub formats: Vec<Format>,
}

impl std::str::FromStr for ColumnArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, flags) = match s.split_once(':') {
            Some((head, flags)) => (head, flags),
            None => (s, ""),
        };
        let (key, display) = match head.split_once('=') {
            Some((key, display)) => (key, Some(display.to_string())),
            None => (head, None),
        };
        if key.is_empty() {
            return Err(format!("column argument '{}' has no key", s));
        }

        let mut arg = ColumnArg {
            key: key.to_string(),
            display,
            sortable: false,
            searchable: false,
            hidden: false,
            formats: Vec::new(),
        };
        for flag in flags.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            match flag {
                "sortable" => arg.sortable = true,
                "searchable" => arg.searchable = true,
                "hidden" => arg.hidden = true,
                other => arg.formats.push(
                    Format::from_id(other)
                        .ok_or_else(|| format!("unknown flag or format '{}' in '{}'", other, s))?,
                ),
            }
        }
        Ok(arg)
    }
}
