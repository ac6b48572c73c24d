//! Line-driven event loop over a navigation session.
//!
//! Each input line is one user interaction; output is re-rendered before the
//! next line is read.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use tracing::debug;

use crate::application::services::NavigationSession;

const HELP: &str = "\
commands:
  show          render the tree
  toggle URL    expand or collapse the section at URL
  lang CODE     switch and save the display language
  find URL      print the path to URL
  help          this text
  quit          leave";

/// One user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Show,
    Toggle(String),
    Lang(String),
    Find(String),
    Help,
    Quit,
}

impl FromStr for Event {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::to_string);
        if parts.next().is_some() {
            return Err(format!("too many arguments: {line}"));
        }
        let need = |arg: Option<String>| arg.ok_or_else(|| format!("{command}: missing argument"));
        match command {
            "show" | "s" => Ok(Event::Show),
            "toggle" | "t" => Ok(Event::Toggle(need(arg)?)),
            "lang" | "l" => Ok(Event::Lang(need(arg)?)),
            "find" | "f" => Ok(Event::Find(need(arg)?)),
            "help" | "?" => Ok(Event::Help),
            "quit" | "q" | "exit" => Ok(Event::Quit),
            other => Err(format!("unknown command: {other} (try help)")),
        }
    }
}

/// Process events from `input` until `quit` or end of input.
///
/// Failed events are reported on `out` and leave the session unchanged;
/// only write errors end the loop early.
pub fn run<R: BufRead, W: Write>(
    session: &mut NavigationSession,
    input: R,
    out: &mut W,
    prompt: bool,
) -> io::Result<()> {
    write!(out, "{}", session.render().to_tree())?;
    let mut lines = input.lines();
    loop {
        if prompt {
            write!(out, "navtoc> ")?;
            out.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event = match line.parse::<Event>() {
            Ok(event) => event,
            Err(msg) => {
                writeln!(out, "error: {msg}")?;
                continue;
            }
        };
        debug!("event: {:?}", event);
        if !handle(session, event, out)? {
            break;
        }
    }
    Ok(())
}

/// Apply one event; returns false when the loop should stop.
fn handle<W: Write>(session: &mut NavigationSession, event: Event, out: &mut W) -> io::Result<bool> {
    match event {
        Event::Show => write!(out, "{}", session.render().to_tree())?,
        Event::Toggle(url) => match session.toggle_url(&url) {
            Ok(subtree) => write!(out, "{}", subtree.to_tree())?,
            Err(e) => writeln!(out, "error: {e}")?,
        },
        Event::Lang(code) => match session.set_language(&code) {
            Ok(tree) => write!(out, "{}", tree.to_tree())?,
            Err(e) => writeln!(out, "error: {e}")?,
        },
        Event::Find(url) => match session.find(&url) {
            Some(idx) => writeln!(out, "{}", session.breadcrumbs(idx).join(" > "))?,
            None => writeln!(out, "not found: {url}")?,
        },
        Event::Help => writeln!(out, "{HELP}")?,
        Event::Quit => return Ok(false),
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use crate::application::services::LanguageSelector;
    use crate::domain::{CollapsePolicy, LanguageSet, TocDocument, TocEntry, TreeBuilder};
    use crate::infrastructure::traits::PreferenceStore;

    #[derive(Default)]
    struct MemoryStore(Mutex<Option<String>>);

    impl PreferenceStore for MemoryStore {
        fn load(&self) -> io::Result<Option<String>> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn save(&self, code: &str) -> io::Result<()> {
            *self.0.lock().unwrap() = Some(code.to_string());
            Ok(())
        }
    }

    fn session() -> NavigationSession {
        let doc = TocDocument {
            entries: vec![TocEntry::new("/a/")
                .label("en", "Components")
                .label("zh", "组件")
                .child(TocEntry::new("/a/x").label("en", "Fragments").label("zh", "片段"))],
            ..TocDocument::default()
        };
        let tree = TreeBuilder::default().build(&doc).unwrap();
        let selector = LanguageSelector::new(
            LanguageSet::new("en", ["en", "zh"]),
            Arc::new(MemoryStore::default()),
        );
        NavigationSession::new(tree, selector, CollapsePolicy::Preserve)
    }

    #[test]
    fn test_parse_events() {
        assert_eq!("toggle /a/".parse::<Event>(), Ok(Event::Toggle("/a/".into())));
        assert_eq!(" q ".parse::<Event>(), Ok(Event::Quit));
        assert!("toggle".parse::<Event>().is_err());
        assert!("dance".parse::<Event>().is_err());
    }

    #[test]
    fn given_script_when_running_then_processes_events_in_order() {
        let mut session = session();
        let input = Cursor::new("toggle /a/\nlang zh\nlang xx\nfind /a/x\nquit\nshow\n");
        let mut out = Vec::new();
        run(&mut session, input, &mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("▾ Components"));
        assert!(text.contains("▾ 组件"));
        assert!(text.contains("error: unsupported language: xx"));
        assert!(text.contains("Contents > 组件 > 片段"));
        assert_eq!(session.language(), "zh");
        // nothing after quit is processed
        assert_eq!(text.matches("Contents").count(), 3);
    }
}
