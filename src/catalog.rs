//! Built-in catalog of Windows shell, privacy and performance settings
//!
//! ```rust
//! let registry = regtune::catalog::windows_catalog().unwrap();
//! assert!(registry.get("show_ext").is_some());
//! ```

use crate::config::{SchemaRegistry, SettingDefinition, SideEffect, opt};
use crate::error::Result;
use crate::store::Location;

const PERSONALIZE: &str = r"HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\Themes\Personalize";
const DWM: &str = r"HKEY_CURRENT_USER\Software\Microsoft\Windows\DWM";
const EXPLORER_ADVANCED: &str = r"HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\Explorer\Advanced";
const SEARCH: &str = r"HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\Search";
const FEEDS: &str = r"HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\Feeds";
const ADVERTISING: &str = r"HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\AdvertisingInfo";
const POLICY_SYSTEM: &str = r"HKEY_LOCAL_MACHINE\SOFTWARE\Policies\Microsoft\Windows\System";
const POLICY_DATA_COLLECTION: &str = r"HKEY_LOCAL_MACHINE\SOFTWARE\Policies\Microsoft\Windows\DataCollection";
const CLOUD_CONTENT: &str = r"HKEY_LOCAL_MACHINE\SOFTWARE\Policies\Microsoft\Windows\CloudContent";
const LOCATION_POLICY: &str = r"HKEY_LOCAL_MACHINE\SOFTWARE\Policies\Microsoft\Windows\LocationAndSensors";
const SEARCH_POLICY: &str = r"HKEY_LOCAL_MACHINE\SOFTWARE\Policies\Microsoft\Windows\Windows Search";
const CONTENT_DELIVERY: &str = r"HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\ContentDeliveryManager";
const INPUT_PERSONALIZATION: &str = r"HKEY_CURRENT_USER\Software\Microsoft\InputPersonalization";
const PRIVACY: &str = r"HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\Privacy";
const DEFENDER_POLICY: &str = r"HKEY_LOCAL_MACHINE\SOFTWARE\Policies\Microsoft\Windows Defender";
const UPDATE_POLICY: &str = r"HKEY_LOCAL_MACHINE\SOFTWARE\Policies\Microsoft\Windows\WindowsUpdate\AU";
const BACKGROUND_APPS: &str = r"HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\BackgroundAccessApplications";
const VISUAL_EFFECTS: &str = r"HKEY_CURRENT_USER\SOFTWARE\Microsoft\Windows\CurrentVersion\Explorer\VisualEffects";
const SESSION_POWER: &str = r"HKEY_LOCAL_MACHINE\SYSTEM\CurrentControlSet\Control\Session Manager\Power";
const POWER: &str = r"HKEY_LOCAL_MACHINE\SYSTEM\CurrentControlSet\Control\Power";
const GRAPHICS_DRIVERS: &str = r"HKEY_LOCAL_MACHINE\SYSTEM\CurrentControlSet\Control\GraphicsDrivers";
const GAME_DVR: &str = r"HKEY_LOCAL_MACHINE\SOFTWARE\Policies\Microsoft\Windows\GameDVR";
const MULTIMEDIA_PROFILE: &str = r"HKEY_LOCAL_MACHINE\SOFTWARE\Microsoft\Windows NT\CurrentVersion\Multimedia\SystemProfile";
const FILE_SYSTEM: &str = r"HKEY_LOCAL_MACHINE\SYSTEM\CurrentControlSet\Control\FileSystem";
const MEMORY_MANAGEMENT: &str = r"HKEY_LOCAL_MACHINE\SYSTEM\CurrentControlSet\Control\Session Manager\Memory Management";
const DESKTOP: &str = r"HKEY_CURRENT_USER\Control Panel\Desktop";
const MOUSE: &str = r"HKEY_CURRENT_USER\Control Panel\Mouse";

/// First Windows 11 build
pub const WINDOWS_11: u32 = 22000;

const SHELL: SideEffect = SideEffect::ReauthSession;

fn at(path: &str, name: &str) -> Result<Location> {
    Location::parse(path, name)
}

fn on_page(page: &str, definitions: Vec<SettingDefinition>) -> Vec<SettingDefinition> {
    definitions.into_iter().map(|d| d.page(page)).collect()
}

/// Validated registry of every built-in setting
pub fn windows_catalog() -> Result<SchemaRegistry> {
    SchemaRegistry::new(windows_definitions()?)
}

/// Built-in setting definitions in display order
pub fn windows_definitions() -> Result<Vec<SettingDefinition>> {
    let mut all = Vec::new();
    all.extend(personalization()?);
    all.extend(taskbar_and_start()?);
    all.extend(file_explorer()?);
    all.extend(privacy()?);
    all.extend(system_and_performance()?);
    Ok(all)
}

fn personalization() -> Result<Vec<SettingDefinition>> {
    Ok(on_page(
        "Personalization",
        vec![
            SettingDefinition::switch("apps_dark", "Force Dark Mode (Apps)", at(PERSONALIZE, "AppsUseLightTheme")?, 0, 1, 1)
                .section("Theme")
                .tooltip("Forces supported apps to use Dark theme.")
                .side_effect(SHELL),
            SettingDefinition::switch("system_dark", "Force Dark Mode (System UI)", at(PERSONALIZE, "SystemUsesLightTheme")?, 0, 1, 1)
                .section("Theme")
                .tooltip("Sets system UI (Start, Taskbar) to Dark.")
                .side_effect(SHELL),
            SettingDefinition::switch("transparency", "Transparency Effects", at(PERSONALIZE, "EnableTransparency")?, 1, 0, 1)
                .section("Effects")
                .tooltip("Enable acrylic/transparency effects.")
                .side_effect(SHELL),
            SettingDefinition::switch("accent_taskbar", "Accent Color on Start/Taskbar", at(PERSONALIZE, "ColorPrevalence")?, 1, 0, 0)
                .section("Accent")
                .tooltip("Show accent color on Start, Taskbar and action center.")
                .side_effect(SHELL),
            SettingDefinition::switch("accent_title", "Accent Color on Title bars and Windows", at(DWM, "ColorPrevalence")?, 1, 0, 0)
                .section("Accent")
                .tooltip("Show accent color on title bars and window borders.")
                .side_effect(SHELL),
            SettingDefinition::switch("taskbar_animations", "Taskbar Animations", at(EXPLORER_ADVANCED, "TaskbarAnimations")?, 1, 0, 1)
                .section("Animations")
                .tooltip("Enable/disable taskbar animations.")
                .side_effect(SHELL),
            SettingDefinition::switch("disable_aero_shake", "Disable Aero Shake", at(EXPLORER_ADVANCED, "DisallowShaking")?, 1, 0, 0)
                .section("Gestures")
                .tooltip("Prevents windows from minimizing when shaking a title bar.")
                .side_effect(SHELL),
        ],
    ))
}

fn taskbar_and_start() -> Result<Vec<SettingDefinition>> {
    Ok(on_page(
        "Taskbar & Start",
        vec![
            SettingDefinition::choice(
                "search_style",
                "Search Bar Style",
                at(SEARCH, "SearchboxTaskbarMode")?,
                vec![opt("Hide", 0), opt("Icon Only", 1), opt("Search Box", 2)],
                1,
            )
            .section("Taskbar")
            .tooltip("Choose between hiding, icon-only, or full search box.")
            .side_effect(SHELL),
            SettingDefinition::choice(
                "taskbar_size",
                "Taskbar Size",
                at(EXPLORER_ADVANCED, "TaskbarSi")?,
                vec![opt("Small", 0), opt("Medium", 1), opt("Large", 2)],
                1,
            )
            .section("Taskbar")
            .tooltip("Set taskbar icon size.")
            .min_build(WINDOWS_11)
            .side_effect(SHELL),
            SettingDefinition::choice(
                "taskbar_align",
                "Taskbar Alignment",
                at(EXPLORER_ADVANCED, "TaskbarAl")?,
                vec![opt("Left", 0), opt("Center", 1)],
                1,
            )
            .section("Taskbar")
            .tooltip("Align taskbar icons.")
            .min_build(WINDOWS_11)
            .side_effect(SHELL),
            SettingDefinition::choice(
                "taskbar_glom",
                "Combine Taskbar Buttons",
                at(EXPLORER_ADVANCED, "TaskbarGlomLevel")?,
                vec![
                    opt("Always combine, hide labels", 0),
                    opt("Combine when taskbar is full", 1),
                    opt("Never combine", 2),
                ],
                0,
            )
            .section("Taskbar")
            .tooltip("Show/Combine taskbar labels (Win11 may limit).")
            .side_effect(SHELL),
            SettingDefinition::switch("clock_seconds", "Show Seconds in Taskbar Clock", at(EXPLORER_ADVANCED, "ShowSecondsInSystemClock")?, 1, 0, 0)
                .section("Clock")
                .tooltip("Adds seconds to taskbar clock (uses more resources).")
                .side_effect(SHELL),
            SettingDefinition::switch("taskview_btn", "Show Task View Button", at(EXPLORER_ADVANCED, "ShowTaskViewButton")?, 1, 0, 1)
                .section("Buttons")
                .tooltip("Shows the Task View (virtual desktops) button.")
                .side_effect(SHELL),
            SettingDefinition::switch("widgets_btn", "Show Widgets Button", at(EXPLORER_ADVANCED, "TaskbarMn")?, 1, 0, 0)
                .section("Buttons")
                .tooltip("Shows the Widgets button on taskbar (if available).")
                .min_build(WINDOWS_11)
                .side_effect(SHELL),
            SettingDefinition::choice(
                "news_interests",
                "News & Interests (Windows 10)",
                at(FEEDS, "ShellFeedsTaskbarViewMode")?,
                vec![opt("Icon and text", 0), opt("Icon only", 1), opt("Off", 2)],
                2,
            )
            .section("News")
            .tooltip("Controls the News & Interests taskbar widget.")
            .side_effect(SHELL),
            SettingDefinition::switch("start_most_used", "Show Most Used Apps", at(EXPLORER_ADVANCED, "Start_TrackProgs")?, 1, 0, 1)
                .section("Start Menu")
                .tooltip("Show most used apps in Start.")
                .side_effect(SHELL),
            SettingDefinition::switch("start_recent", "Show Recently Added/Opened", at(EXPLORER_ADVANCED, "Start_TrackDocs")?, 1, 0, 1)
                .section("Start Menu")
                .tooltip("Show recently added apps and opened items.")
                .side_effect(SHELL),
        ],
    ))
}

fn file_explorer() -> Result<Vec<SettingDefinition>> {
    Ok(on_page(
        "File Explorer & UI",
        vec![
            SettingDefinition::switch("show_hidden", "Show Hidden Files", at(EXPLORER_ADVANCED, "Hidden")?, 1, 2, 2)
                .section("Visibility")
                .tooltip("Show items with the Hidden attribute.")
                .side_effect(SHELL),
            SettingDefinition::switch("show_ext", "Show File Extensions", at(EXPLORER_ADVANCED, "HideFileExt")?, 0, 1, 1)
                .section("Visibility")
                .tooltip("Show known file type extensions.")
                .side_effect(SHELL),
            SettingDefinition::switch("show_superhidden", "Show Protected OS Files", at(EXPLORER_ADVANCED, "ShowSuperHidden")?, 1, 0, 0)
                .section("Visibility")
                .tooltip("Show protected operating system files (be careful).")
                .side_effect(SHELL),
            SettingDefinition::switch("compact_view", "Use Compact View", at(EXPLORER_ADVANCED, "UseCompactMode")?, 1, 0, 0)
                .section("Layout")
                .tooltip("Smaller spacing in File Explorer lists.")
                .min_build(WINDOWS_11)
                .side_effect(SHELL),
            SettingDefinition::choice(
                "explorer_launchto",
                "Open File Explorer to",
                at(EXPLORER_ADVANCED, "LaunchTo")?,
                vec![opt("Home (Windows 11)", 0), opt("This PC", 1), opt("Quick Access", 2)],
                1,
            )
            .section("Behavior")
            .tooltip("Choose default start location for File Explorer.")
            .side_effect(SHELL),
            SettingDefinition::switch("status_bar", "Show Status Bar", at(EXPLORER_ADVANCED, "ShowStatusBar")?, 1, 0, 1)
                .section("UI")
                .tooltip("Show status bar at the bottom of File Explorer.")
                .side_effect(SHELL),
            SettingDefinition::switch("info_tips", "Show Info Tips on Hover", at(EXPLORER_ADVANCED, "ShowInfoTip")?, 1, 0, 1)
                .section("UI")
                .tooltip("Show pop-up info tooltips when hovering items.")
                .side_effect(SHELL),
            SettingDefinition::switch("checkbox_select", "Use Check Boxes to Select Items", at(EXPLORER_ADVANCED, "AutoCheckSelect")?, 1, 0, 0)
                .section("Selection")
                .tooltip("Show check boxes for item selection.")
                .side_effect(SHELL),
            SettingDefinition::switch("nav_expand", "Expand to Current Folder", at(EXPLORER_ADVANCED, "NavPaneExpandToCurrentFolder")?, 1, 0, 0)
                .section("Navigation")
                .tooltip("Automatically expand navigation pane to the current folder.")
                .side_effect(SHELL),
            SettingDefinition::switch("separate_process", "Launch Folder Windows in a Separate Process", at(EXPLORER_ADVANCED, "SeparateProcess")?, 1, 0, 0)
                .section("Process")
                .tooltip("Improves stability; uses more memory.")
                .side_effect(SHELL),
            SettingDefinition::switch("sync_provider", "Show Sync Provider Notifications", at(EXPLORER_ADVANCED, "ShowSyncProviderNotifications")?, 1, 0, 1)
                .section("Sync")
                .tooltip("Show OneDrive/Provider notifications in Explorer.")
                .side_effect(SHELL),
            SettingDefinition::switch("taskbar_badges", "Show Taskbar Badges", at(EXPLORER_ADVANCED, "TaskbarBadges")?, 1, 0, 1)
                .section("Taskbar")
                .tooltip("Show badges on taskbar buttons.")
                .side_effect(SHELL),
        ],
    ))
}

fn privacy() -> Result<Vec<SettingDefinition>> {
    Ok(on_page(
        "Privacy",
        vec![
            SettingDefinition::switch("ads_id", "Disable Advertising ID", at(ADVERTISING, "Enabled")?, 0, 1, 1)
                .section("Advertising")
                .tooltip("Disables per-user advertising identifier."),
            SettingDefinition::switch("activity_history", "Disable Activity History", at(POLICY_SYSTEM, "PublishUserActivities")?, 0, 1, 1)
                .section("Activity")
                .tooltip("Turns off collection/upload of activity history.")
                .side_effect(SideEffect::SignOut),
            SettingDefinition::switch("activity_upload", "Disable Activity Upload", at(POLICY_SYSTEM, "UploadUserActivities")?, 0, 1, 1)
                .section("Activity")
                .tooltip("Blocks uploading activity history to Microsoft.")
                .side_effect(SideEffect::SignOut),
            SettingDefinition::choice(
                "telemetry",
                "Diagnostic Data Level",
                at(POLICY_DATA_COLLECTION, "AllowTelemetry")?,
                vec![
                    opt("Security (0)", 0),
                    opt("Basic (1)", 1),
                    opt("Enhanced (2)", 2),
                    opt("Full (3)", 3),
                ],
                3,
            )
            .section("Diagnostics")
            .tooltip("Lower is more private; availability depends on edition."),
            SettingDefinition::switch("consumer_features", "Disable Consumer Experience", at(CLOUD_CONTENT, "DisableConsumerFeatures")?, 1, 0, 0)
                .section("Consumer")
                .tooltip("Prevents suggested apps and dynamic content."),
            SettingDefinition::switch("clipboard_history", "Disable Clipboard History", at(POLICY_SYSTEM, "AllowClipboardHistory")?, 0, 1, 1)
                .section("Clipboard")
                .tooltip("Turns off Windows clipboard history."),
            SettingDefinition::switch("disable_location", "Disable Location", at(LOCATION_POLICY, "DisableLocation")?, 1, 0, 0)
                .section("Location")
                .tooltip("Globally disable Windows location services."),
            SettingDefinition::switch("cortana", "Disable Cortana", at(SEARCH_POLICY, "AllowCortana")?, 0, 1, 1)
                .section("Cortana")
                .tooltip("Turns off Cortana.")
                .side_effect(SideEffect::SignOut),
            SettingDefinition::switch("tips_tricks", "Disable Tips, Tricks, and Suggestions", at(CONTENT_DELIVERY, "SubscribedContent-338393Enabled")?, 0, 1, 1)
                .section("Suggestions")
                .tooltip("Disables OS tips and suggestions."),
            SettingDefinition::switch("silent_apps", "Disable App Silent Installs", at(CONTENT_DELIVERY, "SilentInstalledAppsEnabled")?, 0, 1, 1)
                .section("Suggestions")
                .tooltip("Prevents suggested apps auto-install."),
            SettingDefinition::switch("pane_suggestions", "Disable System Pane Suggestions", at(CONTENT_DELIVERY, "SystemPaneSuggestionsEnabled")?, 0, 1, 1)
                .section("Suggestions")
                .tooltip("Turns off suggestions in the Settings sidebar."),
            SettingDefinition::switch("lock_spotlight", "Disable Lock Screen Spotlight", at(CONTENT_DELIVERY, "RotatingLockScreenEnabled")?, 0, 1, 1)
                .section("Spotlight")
                .tooltip("Disables Windows Spotlight on lock screen."),
            SettingDefinition::switch("lock_overlay", "Disable Lock Screen Overlay", at(CONTENT_DELIVERY, "RotatingLockScreenOverlayEnabled")?, 0, 1, 1)
                .section("Spotlight")
                .tooltip("Disables Spotlight fun facts/trivia on lock screen."),
            SettingDefinition::switch(
                "tailored_experiences",
                "Disable Tailored Experiences",
                at(PRIVACY, "TailoredExperiencesWithDiagnosticDataEnabled")?,
                0,
                1,
                1,
            )
            .section("Tailored")
            .tooltip("Disable personalization based on diagnostic data."),
            SettingDefinition::switch("typing_collect", "Disable Typing Data Collection", at(INPUT_PERSONALIZATION, "RestrictImplicitTextCollection")?, 1, 0, 0)
                .section("Typing & Ink")
                .tooltip("Disables text input personalization."),
            SettingDefinition::switch("inking_collect", "Disable Inking Data Collection", at(INPUT_PERSONALIZATION, "RestrictImplicitInkCollection")?, 1, 0, 0)
                .section("Typing & Ink")
                .tooltip("Disables inking input personalization."),
        ],
    ))
}

fn system_and_performance() -> Result<Vec<SettingDefinition>> {
    Ok(on_page(
        "System & Performance",
        vec![
            SettingDefinition::switch("defender_disable", "Disable Windows Defender", at(DEFENDER_POLICY, "DisableAntiSpyware")?, 1, 0, 0)
                .section("Security")
                .tooltip("Legacy policy; modern Windows may ignore it.")
                .side_effect(SideEffect::Restart),
            SettingDefinition::switch("wu_disable", "Disable Automatic Windows Updates", at(UPDATE_POLICY, "NoAutoUpdate")?, 1, 0, 0)
                .section("Updates")
                .tooltip("Stops automatic Windows Updates.")
                .side_effect(SideEffect::Restart),
            SettingDefinition::switch("bg_apps", "Disable Background Apps", at(BACKGROUND_APPS, "GlobalUserDisabled")?, 1, 0, 0)
                .section("Apps")
                .tooltip("Prevents apps from running in the background."),
            SettingDefinition::switch("fast_startup", "Disable Fast Startup", at(SESSION_POWER, "HiberbootEnabled")?, 0, 1, 1)
                .section("Boot")
                .tooltip("Can help with dual-boot or driver issues.")
                .side_effect(SideEffect::Restart),
            SettingDefinition::switch("hibernate", "Enable Hibernation", at(POWER, "HibernateEnabled")?, 1, 0, 1)
                .section("Power")
                .tooltip("Required for Fast Startup; disabling frees disk space.")
                .side_effect(SideEffect::Restart),
            SettingDefinition::switch("hws", "Enable Hardware-Accelerated GPU Scheduling", at(GRAPHICS_DRIVERS, "HwSchMode")?, 2, 1, 1)
                .section("Graphics")
                .tooltip("Requires supported GPU/driver.")
                .side_effect(SideEffect::Restart),
            SettingDefinition::switch("game_dvr", "Disable Game DVR (Recording)", at(GAME_DVR, "AllowGameDVR")?, 0, 1, 1)
                .section("Gaming")
                .tooltip("Disables background recording to reduce overhead."),
            SettingDefinition::choice(
                "visualfx",
                "Visual Effects",
                at(VISUAL_EFFECTS, "VisualFXSetting")?,
                vec![
                    opt("Let Windows Decide (1)", 1),
                    opt("Best Appearance (3)", 3),
                    opt("Best Performance (2)", 2),
                ],
                1,
            )
            .section("Visuals")
            .tooltip("Switch between performance vs appearance presets."),
            SettingDefinition::choice(
                "net_throttle",
                "Network Throttling",
                at(MULTIMEDIA_PROFILE, "NetworkThrottlingIndex")?,
                vec![opt("Default (10)", 10), opt("Disabled (0xFFFFFFFF)", 0xFFFF_FFFF)],
                10,
            )
            .section("Network")
            .tooltip("Disabling may help with some latency-sensitive workloads.")
            .side_effect(SideEffect::Restart),
            SettingDefinition::choice(
                "sys_responsiveness",
                "System Responsiveness",
                at(MULTIMEDIA_PROFILE, "SystemResponsiveness")?,
                vec![opt("Gaming (10)", 10), opt("Default (20)", 20), opt("Multimedia (75)", 75)],
                20,
            )
            .section("CPU Scheduling")
            .tooltip("Lower dedicates more CPU to foreground apps."),
            SettingDefinition::switch("ntfs_last_access", "Disable Last Access Time", at(FILE_SYSTEM, "NtfsDisableLastAccessUpdate")?, 1, 0, 1)
                .section("NTFS")
                .tooltip("Prevents updating last access timestamps on files (performance).")
                .side_effect(SideEffect::Restart),
            // Windows ships 2 (per volume); resetting writes "off"
            SettingDefinition::switch("ntfs_83", "Disable 8.3 Name Creation", at(FILE_SYSTEM, "NtfsDisable8dot3NameCreation")?, 1, 0, 0)
                .section("NTFS")
                .tooltip("Disables short 8.3 names on NTFS; speeds up file ops.")
                .side_effect(SideEffect::Restart),
            SettingDefinition::switch("disable_paging_exec", "Disable Paging Executive (Advanced)", at(MEMORY_MANAGEMENT, "DisablePagingExecutive")?, 1, 0, 0)
                .section("Memory")
                .tooltip("Keeps kernel/drivers in RAM (handle with care).")
                .side_effect(SideEffect::Restart),
            SettingDefinition::bounded("menu_delay", "Menu Show Delay (ms)", at(DESKTOP, "MenuShowDelay")?, 0, 2000, 10, 400)
                .text_encoded()
                .section("Menus")
                .tooltip("Lower feels snappier; default ~400ms."),
            SettingDefinition::bounded("mouse_hover", "Mouse Hover Time (ms)", at(MOUSE, "MouseHoverTime")?, 0, 2000, 10, 400)
                .text_encoded()
                .section("Mouse")
                .tooltip("Delay before hover events; default ~400ms."),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RawValue, SettingKind, ValueEncoding};

    #[test]
    fn test_catalog_is_valid() {
        let registry = windows_catalog().unwrap();
        assert_eq!(registry.len(), windows_definitions().unwrap().len());
        assert_eq!(
            registry.pages(),
            [
                "Personalization",
                "Taskbar & Start",
                "File Explorer & UI",
                "Privacy",
                "System & Performance"
            ]
        );
    }

    #[test]
    fn test_windows_11_gates() {
        let registry = windows_catalog().unwrap();
        let win10 = registry.active_definitions(19045);
        let win11 = registry.active_definitions(22631);

        assert_eq!(win11.len(), registry.len());
        assert_eq!(win11.len() - win10.len(), 4);
        assert!(!win10.iter().any(|d| d.id == "taskbar_align"));
    }

    #[test]
    fn test_text_encoded_delays() {
        let registry = windows_catalog().unwrap();
        let delay = registry.get("menu_delay").unwrap();

        assert_eq!(delay.encoding, ValueEncoding::Text);
        assert_eq!(delay.default, RawValue::Text("400".into()));
        assert!(matches!(
            delay.kind,
            SettingKind::BoundedInteger {
                min: 0,
                max: 2000,
                step: 10
            }
        ));
    }

    #[test]
    fn test_side_effects_assigned() {
        let registry = windows_catalog().unwrap();
        assert_eq!(
            registry.get("show_ext").unwrap().side_effect,
            SideEffect::ReauthSession
        );
        assert_eq!(
            registry.get("cortana").unwrap().side_effect,
            SideEffect::SignOut
        );
        assert_eq!(
            registry.get("hibernate").unwrap().side_effect,
            SideEffect::Restart
        );
        assert_eq!(registry.get("ads_id").unwrap().side_effect, SideEffect::None);
    }
}
