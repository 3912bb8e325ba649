//! Command scripts fed to the ngccm tool.

/// Command that makes the tool exit.
pub const QUIT: &str = "quit";

const RULE: &str = "----------------------------";

/// One command or an ordered sequence of commands.
///
/// A single command converts to a one-element list, so every send variant can
/// take `"get HF1-mezz_reg4"` and `vec![...]` alike.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandList(Vec<String>);

impl CommandList {
    pub fn new(cmds: Vec<String>) -> Self {
        Self(cmds)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The commands as they are sent: `quit` is appended unless the caller
    /// already put it somewhere in the list.
    pub fn into_script(self) -> Vec<String> {
        let mut cmds = self.0;
        if !cmds.iter().any(|c| c == QUIT) {
            cmds.push(QUIT.to_string());
        }
        cmds
    }
}

impl From<&str> for CommandList {
    fn from(cmd: &str) -> Self {
        Self(vec![cmd.to_string()])
    }
}

impl From<String> for CommandList {
    fn from(cmd: String) -> Self {
        Self(vec![cmd])
    }
}

impl From<&String> for CommandList {
    fn from(cmd: &String) -> Self {
        Self(vec![cmd.clone()])
    }
}

impl From<Vec<String>> for CommandList {
    fn from(cmds: Vec<String>) -> Self {
        Self(cmds)
    }
}

impl From<Vec<&str>> for CommandList {
    fn from(cmds: Vec<&str>) -> Self {
        Self(cmds.into_iter().map(str::to_string).collect())
    }
}

impl From<&[String]> for CommandList {
    fn from(cmds: &[String]) -> Self {
        Self(cmds.to_vec())
    }
}

impl From<&[&str]> for CommandList {
    fn from(cmds: &[&str]) -> Self {
        Self(cmds.iter().map(|c| c.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for CommandList {
    fn from(cmds: [&str; N]) -> Self {
        Self(cmds.iter().map(|c| c.to_string()).collect())
    }
}

/// Human-readable record of the script that was run.
pub fn transcript(script: &[String]) -> String {
    let mut log = format!("{RULE}\nYou ran the following script with the ngccm tool:\n");
    for c in script {
        log.push_str(c);
        log.push('\n');
    }
    log.push_str(RULE);
    log.push('\n');
    log.trim().to_string()
}

/// The script as one newline-terminated block, for piping into the tool.
pub fn joined(script: &[String]) -> String {
    script.iter().map(|c| format!("{c}\n")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_command_becomes_one_element_list() {
        let list = CommandList::from("get HF1-mezz_reg4");
        assert_eq!(list.len(), 1);
        assert_eq!(list.into_script(), vec!["get HF1-mezz_reg4", "quit"]);
    }

    #[test]
    fn test_quit_appended_once() {
        let script = CommandList::from(vec!["put HF1-bkp_reset 1", "quit"]).into_script();
        assert_eq!(script, vec!["put HF1-bkp_reset 1", "quit"]);
        assert_eq!(script.iter().filter(|c| *c == QUIT).count(), 1);

        let script = CommandList::from(["a", "b"]).into_script();
        assert_eq!(script, vec!["a", "b", "quit"]);
    }

    #[test]
    fn test_quit_position_is_preserved() {
        let script = CommandList::from(["quit", "get x"]).into_script();
        assert_eq!(script, vec!["quit", "get x"]);
    }

    #[test]
    fn test_empty_list_still_quits() {
        assert_eq!(CommandList::default().into_script(), vec!["quit"]);
    }

    #[test]
    fn test_transcript_format() {
        let script = CommandList::from("get HF1-mezz_reg4").into_script();
        assert_eq!(
            transcript(&script),
            "----------------------------\nYou ran the following script with the ngccm tool:\nget HF1-mezz_reg4\nquit\n----------------------------"
        );
    }

    #[test]
    fn test_joined() {
        let script = CommandList::from(["a", "b"]).into_script();
        assert_eq!(joined(&script), "a\nb\nquit\n");
    }
}
