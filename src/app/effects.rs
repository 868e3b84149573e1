use std::io::{Write, stdout};

use base64::Engine;

use crate::app::{App, Message, Model, ToastLevel};
use crate::markup::zone_element;

impl App {
    pub(super) fn handle_message_side_effects(model: &mut Model, msg: &Message) {
        match msg {
            Message::CopyZone => Self::copy_active_zone(model),
            Message::Save => match model.save_to_disk() {
                Ok(()) => {
                    model.show_toast(
                        ToastLevel::Info,
                        format!("Saved {}", model.file_path.display()),
                    );
                }
                Err(err) => {
                    tracing::warn!(path = %model.file_path.display(), %err, "save failed");
                    model.show_toast(ToastLevel::Error, format!("Save failed: {err:#}"));
                }
            },
            Message::ForceReload => {
                if let Err(err) = model.reload_from_disk() {
                    tracing::warn!(path = %model.file_path.display(), %err, "reload failed");
                    model.show_toast(ToastLevel::Error, format!("Reload failed: {err:#}"));
                } else {
                    model.show_toast(ToastLevel::Info, "Reloaded");
                }
            }
            _ => {}
        }
    }

    fn copy_active_zone(model: &mut Model) {
        let Some(zone) = model.decorator.active_zone() else {
            model.show_toast(ToastLevel::Info, "No active zone");
            return;
        };
        match copy_to_clipboard(&zone_element(zone.region)) {
            Ok(()) => model.show_toast(ToastLevel::Info, format!("Copied zone {}", zone.region)),
            Err(err) => model.show_toast(ToastLevel::Error, format!("Copy failed: {err}")),
        }
    }
}

fn copy_to_clipboard(text: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        if copy_to_pbcopy(text).is_ok() {
            return Ok(());
        }
    }
    copy_to_clipboard_osc52(text)
}

#[cfg(target_os = "macos")]
fn copy_to_pbcopy(text: &str) -> std::io::Result<()> {
    use std::process::{Command, Stdio};

    let mut child = Command::new("pbcopy").stdin(Stdio::piped()).spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other("pbcopy failed"))
    }
}

fn copy_to_clipboard_osc52(text: &str) -> std::io::Result<()> {
    let osc = osc52_sequence(text);
    let mut out = stdout();
    out.write_all(osc.as_bytes())?;
    out.flush()
}

fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}
