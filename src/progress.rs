use std::sync::{Arc, OnceLock};

use indicatif::{ProgressBar, ProgressStyle};

use crate::downloader::ProgressFn;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.green/red}] {bytes}/{total_bytes}";
const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {bytes}";

/// Returns the default progress function, an `indicatif` bar on stderr.
///
/// The bar is created on the first report, once the content length is known;
/// a total of zero means the server did not send one and gets a spinner.
pub fn default_progress_fn() -> ProgressFn {
    let bar: OnceLock<ProgressBar> = OnceLock::new();
    Arc::new(move |_name: &str, current: u64, total: u64, complete: bool| {
        let pb = bar.get_or_init(|| create_progress_bar(total));
        pb.set_position(current);
        if complete {
            pb.finish();
        }
    })
}

fn create_progress_bar(total: u64) -> ProgressBar {
    if total == 0 {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
            pb.set_style(style);
        }
        return pb;
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}
