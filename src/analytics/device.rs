use crate::models::visitor::DeviceType;

const MOBILE_MAX_WIDTH: u32 = 768;
const TABLET_MAX_WIDTH: u32 = 1024;

/// Best-effort device guess from the user agent, overridden by the reported
/// screen width when the client sent one.
pub fn classify(user_agent: &str, screen_width: u32) -> DeviceType {
    let ua = user_agent.to_ascii_lowercase();

    let from_agent = if ua.contains("ipad")
        || ua.contains("tablet")
        || (ua.contains("android") && !ua.contains("mobile"))
    {
        DeviceType::Tablet
    } else if ua.contains("mobi") || ua.contains("iphone") || ua.contains("ipod") {
        DeviceType::Mobile
    } else {
        DeviceType::Desktop
    };

    match screen_width {
        0 => from_agent,
        w if w < MOBILE_MAX_WIDTH => DeviceType::Mobile,
        w if w < TABLET_MAX_WIDTH && from_agent != DeviceType::Desktop => DeviceType::Tablet,
        _ => from_agent,
    }
}

/// Use the client's label when it names a known device type, otherwise classify.
pub fn resolve(label: Option<&str>, user_agent: &str, screen_width: u32) -> DeviceType {
    label
        .and_then(DeviceType::from_label)
        .unwrap_or_else(|| classify(user_agent, screen_width))
}
