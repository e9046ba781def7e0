//! Terminal progress bars for uploads

use indicatif::{ProgressBar, ProgressStyle};
use signage_core::ProgressReporter;
use std::sync::Mutex;

const BAR_TEMPLATE: &str =
    "{spinner:.green} {prefix:>12.cyan.bold} [{bar:30.cyan/dim}] {bytes}/{total_bytes} {msg:.dim}";

/// Byte-level upload progress rendered with indicatif
#[derive(Default)]
pub struct UploadProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl UploadProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(bar) = guard.as_ref() {
                f(bar);
            }
        }
    }
}

impl ProgressReporter for UploadProgress {
    fn init(&self, size: u64, name: &str) {
        let bar = ProgressBar::new(size);
        if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_prefix("Uploading");
        bar.set_message(name.to_string());

        if let Ok(mut guard) = self.bar.lock() {
            if let Some(previous) = guard.replace(bar) {
                previous.finish_and_clear();
            }
        }
    }

    fn update(&self, add: u64, name: Option<&str>) {
        self.with_bar(|bar| {
            bar.inc(add);
            if let Some(name) = name {
                bar.set_message(name.to_string());
            }
        });
    }

    fn end(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
    }
}
