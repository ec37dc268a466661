//! Application classification tables.
//!
//! Pure lookups shared by the command builder and the reconciliation
//! engine: which applications need the D-Bus session bus, how office
//! documents route to suite binaries, how launch targets get their display
//! names, and how an untracked sandbox cmdline maps back to a name.

use std::path::Path;

use crate::target::Target;

/// Application name fragments that need the session bus to function.
///
/// Matching is by substring against the lowercased basename, so `lodraw`
/// catches both the binary and wrappers like `lodraw.sh`.
const DBUS_REQUIRED: &[&str] = &[
    // Office suite and its sub-commands.
    "libreoffice",
    "lowriter",
    "localc",
    "loimpress",
    "lodraw",
    "lomath",
    "lobase",
    "soffice",
    "writer",
    "calc",
    "impress",
    "draw",
    "math",
    "base",
    // Terminals.
    "gnome-terminal",
    "konsole",
    "xfce4-terminal",
    "tilix",
    // File managers.
    "nautilus",
    "dolphin",
    "thunar",
    "nemo",
    "pcmanfm",
    // Text editors.
    "gedit",
    "kate",
    "mousepad",
    "pluma",
    // Document viewers.
    "evince",
    "okular",
    "atril",
    // Mail clients.
    "thunderbird",
    "evolution",
    // Chat clients.
    "telegram",
    "signal",
    "discord",
    "slack",
    // Graphics tools.
    "gimp",
    "inkscape",
    "blender",
    // Media players.
    "vlc",
    "mpv",
    "rhythmbox",
    "totem",
    // Code editors.
    "code",
    "codium",
    "atom",
    "sublime",
];

/// Cmdline patterns for naming adopted sandboxes, checked in order.
const CMDLINE_NAMES: &[(&str, &str)] = &[
    ("firefox", "Firefox (firefox)"),
    ("chrome", "Chrome (google-chrome)"),
    ("lowriter", "LibreOffice Writer"),
    ("localc", "LibreOffice Calc"),
    ("loimpress", "LibreOffice Impress"),
    ("libreoffice", "LibreOffice"),
    ("nautilus", "Files (nautilus)"),
    ("gnome-terminal", "Terminal"),
    ("evince", "Document Viewer"),
];

/// Maps an office document extension to the suite binary that opens it.
///
/// Returns `None` for anything that is not an office document.
pub(crate) fn office_subcommand(ext: &str) -> Option<&'static str> {
    match ext {
        "odt" | "doc" | "docx" | "rtf" | "txt" => Some("lowriter"),
        "ods" | "xls" | "xlsx" => Some("localc"),
        "odp" | "ppt" | "pptx" => Some("loimpress"),
        "odg" => Some("lodraw"),
        "odf" => Some("lomath"),
        "odb" => Some("lobase"),
        _ => None,
    }
}

/// True when `path` is an office document by extension.
pub(crate) fn is_office_document(path: &Path) -> bool {
    extension(path).is_some_and(|ext| office_subcommand(&ext).is_some())
}

/// True when the target needs the session bus to function.
///
/// Office documents always do; everything else is matched by basename
/// against the known application fragments.
pub(crate) fn requires_dbus(target: &Target) -> bool {
    if let Target::File(path) = target
        && is_office_document(path)
    {
        return true;
    }
    let name = target.basename().to_lowercase();
    DBUS_REQUIRED.iter().any(|app| name.contains(app))
}

/// True when a bare command launches the firefox browser.
pub(crate) fn is_browser_command(name: &str) -> bool {
    basename(name).to_lowercase().contains("firefox")
}

/// Derives the display name recorded for a launch.
pub(crate) fn display_name(target: &Target) -> String {
    match target {
        Target::Command(name) => capitalize(name),
        Target::Directory(path) => format!("File Manager ({})", file_name(path)),
        Target::Executable(path) => file_name(path),
        Target::File(path) => {
            let base = file_name(path);
            let category = extension(path).and_then(|ext| file_category(&ext));
            match category {
                Some(cat) => format!("{cat} ({base})"),
                None => format!("File ({base})"),
            }
        }
    }
}

/// Human category label for a document extension.
fn file_category(ext: &str) -> Option<&'static str> {
    match ext {
        "pdf" => Some("PDF"),
        "txt" => Some("Text"),
        "html" | "htm" => Some("Browser"),
        "mp4" | "avi" | "mkv" | "webm" => Some("Video"),
        "mp3" | "wav" | "flac" => Some("Audio"),
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" | "svg" => Some("Image"),
        "doc" | "docx" | "odt" => Some("Document"),
        "xls" | "xlsx" | "ods" => Some("Spreadsheet"),
        "ppt" | "pptx" | "odp" => Some("Presentation"),
        "py" => Some("Python"),
        "sh" => Some("Script"),
        _ => None,
    }
}

/// Derives a display name for an untracked sandbox from its cmdline.
///
/// The pattern table is checked in order; `xdg-open` invocations extract
/// the opened file's name, and the final fallback picks the first plausible
/// program token.
pub(crate) fn name_from_cmdline(cmdline: &str) -> String {
    let lower = cmdline.to_lowercase();

    for (pattern, name) in CMDLINE_NAMES {
        if lower.contains(pattern) {
            return (*name).to_owned();
        }
    }

    if lower.contains("xdg-open") {
        for part in cmdline.split_whitespace() {
            if part.contains('/') && !part.starts_with('-') {
                let base = basename(part);
                if !base.is_empty() {
                    return format!("File ({base})");
                }
            }
        }
        return "File Viewer".to_owned();
    }

    // Any recognizable bare program token.
    for part in cmdline.split_whitespace() {
        if part.contains('/') || part.starts_with('-') {
            continue;
        }
        if part.len() > 2 && part.chars().all(char::is_alphanumeric) {
            return capitalize(part);
        }
    }

    "Sandboxed Application".to_owned()
}

/// Lowercase extension of a path, without the dot.
fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

/// Final path component as an owned string.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Final component of a possibly slash-separated string.
fn basename(s: &str) -> &str {
    s.rsplit('/').next().unwrap_or(s)
}

/// Uppercase the first character and lowercase the rest, as displayed for
/// bare commands.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
