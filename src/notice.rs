use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::sync::Mutex;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

static BUFFER: Mutex<Option<Vec<Notice>>> = Mutex::new(None);

/// Activate buffering. While active, notices are stored instead of
/// printed to stderr.
pub fn activate() {
    if let Ok(mut guard) = BUFFER.lock() {
        *guard = Some(Vec::new());
    }
}

/// Deactivate buffering and return all collected notices.
pub fn drain() -> Vec<Notice> {
    BUFFER
        .lock()
        .ok()
        .and_then(|mut guard| guard.take())
        .unwrap_or_default()
}

/// Emit a notice. If buffering is active the notice is stored;
/// otherwise it is printed to stderr immediately.
pub fn emit(level: Level, message: impl Into<String>) {
    let notice = Notice {
        level,
        message: message.into(),
    };
    if let Ok(mut guard) = BUFFER.lock() {
        if let Some(buf) = guard.as_mut() {
            buf.push(notice);
            return;
        }
    }
    eprintln!("{}", render(&notice, std::io::stderr().is_terminal()));
}

pub fn success(message: impl Into<String>) {
    emit(Level::Success, message);
}

pub fn info(message: impl Into<String>) {
    emit(Level::Info, message);
}

pub fn warn(message: impl Into<String>) {
    emit(Level::Warn, message);
}

pub fn error(message: impl Into<String>) {
    emit(Level::Error, message);
}

fn render(notice: &Notice, use_colors: bool) -> String {
    let text = notice.message.as_str();
    let marker = match notice.level {
        Level::Success => "✓",
        Level::Info => "•",
        Level::Warn => "!",
        Level::Error => "✗",
    };
    if !use_colors {
        return format!("{} {}", marker, text);
    }
    match notice.level {
        Level::Success => format!("{} {}", marker.green(), text),
        Level::Info => format!("{} {}", marker.cyan(), text),
        Level::Warn => format!("{} {}", marker.yellow(), text.yellow()),
        Level::Error => format!("{} {}", marker.red(), text.red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain() {
        let notice = Notice {
            level: Level::Error,
            message: "Failed to save".to_string(),
        };
        assert_eq!(render(&notice, false), "✗ Failed to save");
    }

    #[test]
    fn test_buffer_collects_and_drains() {
        activate();
        success("Ada added as a co-founder");
        warn("State file was unreadable");
        let notices = drain();

        // Other tests may emit while the buffer is active; only check ours.
        assert!(notices.contains(&Notice {
            level: Level::Success,
            message: "Ada added as a co-founder".to_string(),
        }));
        assert!(notices
            .iter()
            .any(|n| n.level == Level::Warn && n.message == "State file was unreadable"));
        assert!(drain().is_empty());
    }
}
