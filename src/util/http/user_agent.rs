const CHROME_VERSIONS: [&str; 12] = [
    "133.0.6943.88", "133.0.6943.60", "132.0.6834.110", "132.0.6834.83",
    "131.0.6778.108", "131.0.6778.85", "130.0.6723.117", "130.0.6723.92",
    "129.0.6668.89", "128.0.6613.138", "127.0.6533.119", "126.0.6478.182",
];

const FIREFOX_VERSIONS: [&str; 8] = [
    "133.0", "132.0", "131.0", "130.0", "129.0", "128.0", "127.0", "126.0",
];

const EDGE_VERSIONS: [&str; 6] = [
    "133.0.3048.56", "132.0.2957.63", "131.0.2903.112", "130.0.2849.80",
    "129.0.2792.65", "128.0.2739.90",
];

// 只挑桌機，行動版頁面的結構與桌機版不同
const OS_STRINGS: [&str; 8] = [
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "Macintosh; Intel Mac OS X 14_7_1",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
    "X11; Fedora; Linux x86_64",
];

fn pick<'a>(items: &[&'a str]) -> &'a str {
    items[rand::random_range(0..items.len())]
}

fn gen_chrome_ua() -> String {
    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
        pick(&OS_STRINGS),
        pick(&CHROME_VERSIONS)
    )
}

fn gen_firefox_ua() -> String {
    let version = pick(&FIREFOX_VERSIONS);
    format!(
        "Mozilla/5.0 ({}; rv:{}) Gecko/20100101 Firefox/{}",
        pick(&OS_STRINGS),
        version,
        version
    )
}

fn gen_edge_ua() -> String {
    let version = pick(&EDGE_VERSIONS);
    let chrome_ver = version.split('.').next().unwrap_or("133");
    // Edge 只出現在 Windows 與 macOS
    let os = pick(&OS_STRINGS[..5]);

    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.0.0 Safari/537.36 Edg/{}",
        os, chrome_ver, version
    )
}

/// Picks a realistic desktop browser user agent.
///
/// Chrome is weighted the heaviest to match real traffic.
pub fn gen_random_ua() -> String {
    match rand::random_range(0..10) {
        0..=5 => gen_chrome_ua(),
        6..=7 => gen_firefox_ua(),
        _ => gen_edge_ua(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_random_ua() {
        for _ in 0..50 {
            let ua = gen_random_ua();
            assert!(ua.starts_with("Mozilla/5.0 ("), "{}", ua);
            assert!(!ua.contains("Mobile"), "{}", ua);
        }
    }

    #[test]
    fn test_gen_edge_ua() {
        let ua = gen_edge_ua();
        assert!(ua.contains(" Edg/"));
        assert!(!ua.contains("Linux"));
    }
}
