//! Format - 通知メッセージ用の表示形式

use chrono::TimeDelta;

const UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

/// `<時>h<分>m<秒>s`。負の値は 0 として表示する
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let total = elapsed.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours}h{minutes}m{seconds}s")
}

/// 1024 単位、小数 1 桁（例: `1.5KiB`）
pub fn format_size(bytes: u64) -> String {
    let mut num = bytes as f64;
    for unit in UNITS {
        if num < 1024.0 {
            return format!("{num:.1}{unit}B");
        }
        num /= 1024.0;
    }
    format!("{num:.1}YiB")
}
