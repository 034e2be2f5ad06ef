//! Startup configuration editor.
//!
//! Runs once before the first connect so the user can change Wi-Fi and
//! broker settings from the device itself.

use crate::config::{ConfigField, DeviceConfig};
use crate::input::InputSource;
use crate::text::truncated;
use crate::ui::dialog::{ask_yes_no, compose_text};
use crate::ui::Display;

/// `(question, entry title, field)` for each editable setting, in order.
const PROMPTS: [(&str, &str, ConfigField); 4] = [
    ("Enter New Wifi?", "WiFi SSID:", ConfigField::Ssid),
    ("Enter New Pass?", "WiFi Pass:", ConfigField::Password),
    ("New Server IP?", "Server IP:", ConfigField::MqttServer),
    ("New Server Pass?", "MQTT Pass:", ConfigField::MqttPass),
];

/// Walk the user through the editable settings.
///
/// Returns `true` when `config` was modified and should be persisted.
pub fn edit_config<D, I>(config: &mut DeviceConfig, display: &mut D, input: &mut I) -> bool
where
    D: Display + ?Sized,
    I: InputSource + ?Sized,
{
    if !ask_yes_no(display, input, "Change Config?") {
        return false;
    }

    let original = config.clone();
    for (question, title, field) in PROMPTS {
        if ask_yes_no(display, input, question) {
            let value = compose_text(display, input, title);
            *config.field_mut(field) = truncated(&value);
            info!("setup: updated {}", field.key());
        }
    }
    if ask_yes_no(display, input, "Reset Config?") {
        info!("setup: restoring defaults");
        *config = DeviceConfig::default();
    }

    *config != original
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Button, InputEvent};
    use crate::testing::{FrameLog, ScriptedInput};

    const NO: [InputEvent; 1] = [InputEvent::Press(Button::Select)];
    const YES: [InputEvent; 2] = [InputEvent::Press(Button::Right), InputEvent::Press(Button::Select)];
    /// Compose the single character "a".
    const ENTER_A: [InputEvent; 5] = [
        InputEvent::Press(Button::Select),
        InputEvent::Release(Button::Select),
        InputEvent::Press(Button::Select),
        InputEvent::Hold(Button::Select),
        InputEvent::Release(Button::Select),
    ];

    fn script(parts: &[&[InputEvent]]) -> ScriptedInput {
        ScriptedInput::new(parts.iter().flat_map(|p| p.iter().copied()))
    }

    #[test]
    fn declining_leaves_config_untouched() {
        let mut config = DeviceConfig::default();
        let mut input = script(&[&NO]);
        assert!(!edit_config(&mut config, &mut FrameLog::default(), &mut input));
        assert_eq!(config, DeviceConfig::default());
    }

    #[test]
    fn accepted_prompts_replace_fields() {
        let mut config = DeviceConfig::default();
        let mut input = script(&[&YES, &YES, &ENTER_A, &NO, &NO, &YES, &ENTER_A, &NO]);
        assert!(edit_config(&mut config, &mut FrameLog::default(), &mut input));
        assert_eq!(config.ssid.as_str(), "a");
        assert_eq!(config.password.as_str(), "pass");
        assert_eq!(config.mqtt_pass.as_str(), "a");
    }

    #[test]
    fn reset_restores_defaults() {
        let mut config = DeviceConfig::default();
        config.username = truncated("Scotty");
        let mut input = script(&[&YES, &NO, &NO, &NO, &NO, &YES]);
        assert!(edit_config(&mut config, &mut FrameLog::default(), &mut input));
        assert_eq!(config, DeviceConfig::default());
    }

    #[test]
    fn walking_through_without_changes_reports_unchanged() {
        let mut config = DeviceConfig::default();
        let mut input = script(&[&YES, &NO, &NO, &NO, &NO, &NO]);
        assert!(!edit_config(&mut config, &mut FrameLog::default(), &mut input));
    }
}
