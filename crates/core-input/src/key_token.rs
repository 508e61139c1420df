use crossterm::event::{
    KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKeyEventKind,
    KeyModifiers as CKeyModifiers,
};

/// Encode a crossterm key event as the raw chunk a VT-style terminal would
/// send for it in raw mode.
///
/// crossterm decodes escape sequences on every platform (and synthesizes key
/// events on Windows consoles, which never produce them); re-encoding keeps
/// the console's key identifiers literal byte sequences everywhere.
///
/// Returns `None` for releases and for keys with no conventional encoding
/// (media keys, lone modifiers).
pub(crate) fn encode_key_event(event: &CKeyEvent) -> Option<String> {
    if !matches!(event.kind, CKeyEventKind::Press | CKeyEventKind::Repeat) {
        return None;
    }
    let mods = event.modifiers;
    let base = match event.code {
        CKeyCode::Char(c) if mods.contains(CKeyModifiers::CONTROL) => control_char(c)?.to_string(),
        CKeyCode::Char(c) => c.to_string(),
        CKeyCode::Enter => "\r".into(),
        CKeyCode::Esc => "\u{1b}".into(),
        CKeyCode::Backspace => "\u{7f}".into(),
        CKeyCode::Tab => "\t".into(),
        CKeyCode::BackTab => "\u{1b}[Z".into(),
        CKeyCode::Up => "\u{1b}[A".into(),
        CKeyCode::Down => "\u{1b}[B".into(),
        CKeyCode::Right => "\u{1b}[C".into(),
        CKeyCode::Left => "\u{1b}[D".into(),
        CKeyCode::Home => "\u{1b}[H".into(),
        CKeyCode::End => "\u{1b}[F".into(),
        CKeyCode::Insert => "\u{1b}[2~".into(),
        CKeyCode::Delete => "\u{1b}[3~".into(),
        CKeyCode::PageUp => "\u{1b}[5~".into(),
        CKeyCode::PageDown => "\u{1b}[6~".into(),
        CKeyCode::F(n) => function_key(n)?.into(),
        CKeyCode::Null
        | CKeyCode::CapsLock
        | CKeyCode::ScrollLock
        | CKeyCode::NumLock
        | CKeyCode::PrintScreen
        | CKeyCode::Pause
        | CKeyCode::Menu
        | CKeyCode::KeypadBegin
        | CKeyCode::Media(_)
        | CKeyCode::Modifier(_) => return None,
    };
    if mods.contains(CKeyModifiers::ALT) && matches!(event.code, CKeyCode::Char(_)) {
        return Some(format!("\u{1b}{base}"));
    }
    Some(base)
}

/// Ctrl+letter → C0 control byte (Ctrl+C → 0x03, Ctrl+Q → 0x11).
fn control_char(c: char) -> Option<char> {
    match c.to_ascii_lowercase() {
        l @ 'a'..='z' => Some(((l as u8 - b'a') + 1) as char),
        '@' | ' ' => Some('\u{0}'),
        '[' => Some('\u{1b}'),
        '\\' => Some('\u{1c}'),
        ']' => Some('\u{1d}'),
        '^' => Some('\u{1e}'),
        '_' => Some('\u{1f}'),
        _ => None,
    }
}

fn function_key(n: u8) -> Option<&'static str> {
    let seq = match n {
        1 => "\u{1b}OP",
        2 => "\u{1b}OQ",
        3 => "\u{1b}OR",
        4 => "\u{1b}OS",
        5 => "\u{1b}[15~",
        6 => "\u{1b}[17~",
        7 => "\u{1b}[18~",
        8 => "\u{1b}[19~",
        9 => "\u{1b}[20~",
        10 => "\u{1b}[21~",
        11 => "\u{1b}[23~",
        12 => "\u{1b}[24~",
        _ => return None,
    };
    Some(seq)
}
