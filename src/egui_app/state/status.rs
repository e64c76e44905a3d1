use egui::Color32;

const MAX_LOG_ENTRIES: usize = 200;

/// Tone used to pick the status badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Idle,
    Busy,
    Info,
    Warning,
    Error,
}

impl StatusTone {
    pub fn badge(self) -> (&'static str, Color32) {
        match self {
            StatusTone::Idle => ("Idle", Color32::from_rgb(42, 42, 42)),
            StatusTone::Busy => ("Working", Color32::from_rgb(31, 139, 255)),
            StatusTone::Info => ("Info", Color32::from_rgb(64, 140, 112)),
            StatusTone::Warning => ("Warning", Color32::from_rgb(192, 136, 26)),
            StatusTone::Error => ("Error", Color32::from_rgb(192, 57, 43)),
        }
    }
}

/// Status bar text, badge and rolling log.
#[derive(Clone, Debug)]
pub struct StatusBarState {
    pub text: String,
    pub badge_label: String,
    pub badge_color: Color32,
    pub log: Vec<String>,
}

impl StatusBarState {
    pub fn idle() -> Self {
        let (label, color) = StatusTone::Idle.badge();
        Self {
            text: "Ready".into(),
            badge_label: label.into(),
            badge_color: color,
            log: Vec::new(),
        }
    }

    pub fn set(&mut self, text: impl Into<String>, tone: StatusTone) {
        let (label, color) = tone.badge();
        self.text = text.into();
        self.badge_label = label.into();
        self.badge_color = color;
        self.log.push(self.text.clone());
        if self.log.len() > MAX_LOG_ENTRIES {
            let excess = self.log.len() - MAX_LOG_ENTRIES;
            self.log.drain(..excess);
        }
    }

    pub fn log_text(&self) -> String {
        self.log.join("\n")
    }
}

impl Default for StatusBarState {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_updates_badge_and_caps_log() {
        let mut status = StatusBarState::idle();
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            status.set(format!("entry {i}"), StatusTone::Info);
        }
        assert_eq!(status.badge_label, "Info");
        assert_eq!(status.log.len(), MAX_LOG_ENTRIES);
        assert_eq!(status.log[0], "entry 5");
        assert!(status.log_text().ends_with("entry 204"));
    }
}
