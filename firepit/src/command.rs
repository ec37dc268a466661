//! Builds the firejail argument vector for a launch.
//!
//! Assembly order matches what firejail expects: isolation flags first,
//! then the program and its arguments. Building never fails; every target
//! classification has a dispatch rule.

use crate::classify;
use crate::policy::Policy;
use crate::target::Target;

/// Flags forcing firefox into an isolated, non-reusing instance.
const FIREFOX_INSTANCE_FLAGS: [&str; 2] = ["--new-instance", "--no-remote"];

/// The assembled invocation, minus the firejail binary itself.
#[derive(Debug, Clone)]
pub(crate) struct BuiltCommand {
    /// Arguments passed to firejail, isolation flags through program argv.
    pub argv: Vec<String>,
    /// Whether the session bus is filtered (true) or blocked (false).
    pub dbus_filtered: bool,
    /// Office suite binary the document was routed to, if any.
    pub office: Option<&'static str>,
    /// Browser profile name applied to the launch, if any.
    pub profile: Option<String>,
}

/// Assembles the firejail argv for `target` under `policy`.
///
/// `browser_profile` is a pre-allocated throwaway profile name, applied
/// only when the target turns out to be a bare browser command.
pub(crate) fn build(target: &Target, policy: Policy, browser_profile: Option<&str>) -> BuiltCommand {
    let mut argv = Vec::new();
    let dbus_filtered = classify::requires_dbus(target);

    // D-Bus is always mediated: filtered for applications that need the
    // session bus, blocked outright for everything else.
    if dbus_filtered {
        argv.push("--dbus-user=filter".to_owned());
        argv.push("--dbus-system=none".to_owned());
    } else {
        argv.push("--dbus-user=none".to_owned());
        argv.push("--dbus-system=none".to_owned());
    }

    match policy {
        Policy::Restrictive => {
            argv.push("--net=none".to_owned());
            argv.push("--nosound".to_owned());
            argv.push("--novideo".to_owned());
        }
        // Session-bus applications keep audio/video under standard; media
        // flags break their desktop integration.
        Policy::Standard => {
            if !dbus_filtered {
                argv.push("--nosound".to_owned());
                argv.push("--novideo".to_owned());
            }
        }
        Policy::Permissive => {}
    }

    let mut office = None;
    let mut profile = None;

    match target {
        Target::Directory(dir) => {
            argv.push("xdg-open".to_owned());
            argv.push(dir.display().to_string());
        }
        Target::File(file) => {
            if let Some(sub) = file
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .and_then(|ext| classify::office_subcommand(&ext))
            {
                office = Some(sub);
                argv.push(sub.to_owned());
            } else {
                argv.push("xdg-open".to_owned());
            }
            argv.push(file.display().to_string());
        }
        Target::Executable(path) => {
            argv.push(path.display().to_string());
        }
        Target::Command(name) => {
            argv.push(name.clone());
            if classify::is_browser_command(name)
                && let Some(p) = browser_profile
            {
                argv.push("-P".to_owned());
                argv.push(p.to_owned());
                for flag in FIREFOX_INSTANCE_FLAGS {
                    argv.push(flag.to_owned());
                }
                profile = Some(p.to_owned());
            }
        }
    }

    BuiltCommand {
        argv,
        dbus_filtered,
        office,
        profile,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn file(path: &str) -> Target {
        Target::File(PathBuf::from(path))
    }

    #[test]
    fn office_document_under_restrictive_gets_full_lockdown() {
        let built = build(&file("/home/user/report.odt"), Policy::Restrictive, None);
        assert_eq!(
            built.argv,
            [
                "--dbus-user=filter",
                "--dbus-system=none",
                "--net=none",
                "--nosound",
                "--novideo",
                "lowriter",
                "/home/user/report.odt",
            ]
        );
        assert!(built.dbus_filtered);
        assert_eq!(built.office, Some("lowriter"));
    }

    #[test]
    fn office_document_under_standard_keeps_media() {
        // The session-bus requirement suppresses the standard media flags.
        let built = build(&file("/home/user/report.odt"), Policy::Standard, None);
        assert_eq!(
            built.argv,
            [
                "--dbus-user=filter",
                "--dbus-system=none",
                "lowriter",
                "/home/user/report.odt",
            ]
        );
    }

    #[test]
    fn plain_file_under_standard_blocks_bus_and_media() {
        let built = build(&file("/home/user/movie.mp4"), Policy::Standard, None);
        assert_eq!(
            built.argv,
            [
                "--dbus-user=none",
                "--dbus-system=none",
                "--nosound",
                "--novideo",
                "xdg-open",
                "/home/user/movie.mp4",
            ]
        );
        assert!(!built.dbus_filtered);
        assert_eq!(built.office, None);
    }

    #[test]
    fn executable_under_permissive_gets_only_bus_flags() {
        let target = Target::Executable(PathBuf::from("/opt/tool/bin/tool"));
        let built = build(&target, Policy::Permissive, None);
        assert_eq!(
            built.argv,
            ["--dbus-user=none", "--dbus-system=none", "/opt/tool/bin/tool"]
        );
    }

    #[test]
    fn directories_open_with_the_file_manager() {
        let target = Target::Directory(PathBuf::from("/home/user/Downloads"));
        let built = build(&target, Policy::Permissive, None);
        assert_eq!(
            built.argv,
            ["--dbus-user=none", "--dbus-system=none", "xdg-open", "/home/user/Downloads"]
        );
    }

    #[test]
    fn session_bus_application_under_standard() {
        let target = Target::Command("nautilus".to_owned());
        let built = build(&target, Policy::Standard, None);
        assert_eq!(
            built.argv,
            ["--dbus-user=filter", "--dbus-system=none", "nautilus"]
        );
    }

    #[test]
    fn firefox_command_gets_profile_flags() {
        let target = Target::Command("firefox".to_owned());
        let built = build(&target, Policy::Standard, Some("firepit-abc123"));
        assert_eq!(
            built.argv,
            [
                "--dbus-user=none",
                "--dbus-system=none",
                "--nosound",
                "--novideo",
                "firefox",
                "-P",
                "firepit-abc123",
                "--new-instance",
                "--no-remote",
            ]
        );
        assert_eq!(built.profile.as_deref(), Some("firepit-abc123"));
    }

    #[test]
    fn firefox_without_profile_omits_profile_flags() {
        let target = Target::Command("firefox".to_owned());
        let built = build(&target, Policy::Permissive, None);
        assert_eq!(
            built.argv,
            ["--dbus-user=none", "--dbus-system=none", "firefox"]
        );
        assert_eq!(built.profile, None);
    }

    #[test]
    fn profile_is_ignored_for_non_browser_commands() {
        let target = Target::Command("gedit".to_owned());
        let built = build(&target, Policy::Standard, Some("firepit-abc123"));
        assert!(!built.argv.contains(&"-P".to_owned()));
        assert_eq!(built.profile, None);
    }
}
