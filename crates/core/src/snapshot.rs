use std::collections::BTreeSet;

pub(crate) const EXE_SUFFIX: &str = ".exe";

/// Strip a trailing `.exe` if present.
pub fn strip_exe(name: &str) -> &str {
    name.strip_suffix(EXE_SUFFIX).unwrap_or(name)
}

/// Lowercased process names observed at one poll tick.
///
/// Every observed name is stored in both its `.exe`-suffixed and unsuffixed
/// form, so catalog aliases match regardless of which form the OS reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSnapshot {
    names: BTreeSet<String>,
}

impl ProcessSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut snapshot = Self::new();
        for name in names {
            snapshot.insert(name.as_ref());
        }
        snapshot
    }

    /// Add one observed process name. Blank names are ignored.
    pub fn insert(&mut self, raw: &str) {
        let name = raw.trim().to_lowercase();
        if name.is_empty() {
            return;
        }
        match name.strip_suffix(EXE_SUFFIX) {
            Some(stem) if !stem.is_empty() => {
                self.names.insert(stem.to_string());
            }
            Some(_) => {}
            None => {
                self.names.insert(format!("{name}{EXE_SUFFIX}"));
            }
        }
        self.names.insert(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ProcessSnapshot {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_names(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_both_forms_for_suffixed_name() {
        let snapshot = ProcessSnapshot::from_names(["Stardew Valley.exe"]);
        assert!(snapshot.contains("stardew valley.exe"));
        assert!(snapshot.contains("stardew valley"));
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn adds_both_forms_for_bare_name() {
        let snapshot = ProcessSnapshot::from_names(["javaw"]);
        assert!(snapshot.contains("javaw"));
        assert!(snapshot.contains("javaw.exe"));
    }

    #[test]
    fn ignores_blank_and_bare_suffix_names() {
        let snapshot = ProcessSnapshot::from_names(["", "   ", ".exe"]);
        assert_eq!(snapshot.iter().collect::<Vec<_>>(), vec![".exe"]);
    }

    #[test]
    fn strip_exe_only_touches_trailing_suffix() {
        assert_eq!(strip_exe("game.exe"), "game");
        assert_eq!(strip_exe("game.exe.bak"), "game.exe.bak");
        assert_eq!(strip_exe("game"), "game");
    }
}
