//! IPA extraction: `Payload/<name>.app/Info.plist`

use std::io::{Read, Seek};

use tracing::{debug, instrument};

use crate::config::ExtractOptions;
use crate::container::Container;
use crate::error::{ExtractError, ExtractResult};
use crate::icon::{self, ResolvedIcon};
use crate::manifest::{decode_dictionary, Dictionary, ManifestValue};
use crate::package::detection::IOS_INFO_PLIST_PATTERN;
use crate::package::ManifestFields;

/// `CFBundleSupportedPlatforms` / `DTPlatformName` values and their family
const PLATFORM_FAMILIES: &[(&str, &str)] = &[
    ("iPhoneOS", "iOS"),
    ("iPhoneSimulator", "iOS"),
    ("AppleTVOS", "tvOS"),
    ("WatchOS", "watchOS"),
    ("MacOSX", "macOS"),
];

/// Map Info.plist keys onto descriptor fields
pub(crate) fn map_info_plist(info: &Dictionary) -> ManifestFields {
    ManifestFields {
        display_name: info.first_text(&["CFBundleDisplayName", "CFBundleName"]),
        unique_identifier: info.first_text(&["CFBundleIdentifier"]),
        version: info.first_text(&["CFBundleShortVersionString"]),
        build_version: info.first_text(&["CFBundleVersion"]),
        executable_name: info.first_text(&["CFBundleExecutable"]),
        minimum_os_version: info.first_text(&["MinimumOSVersion", "LSMinimumSystemVersion"]),
        device_family: device_family(info),
        languages: Vec::new(),
    }
}

fn device_family(info: &Dictionary) -> Option<String> {
    let platform = info
        .get("CFBundleSupportedPlatforms")
        .and_then(ManifestValue::as_array)
        .and_then(<[ManifestValue]>::first)
        .and_then(ManifestValue::to_text)
        .or_else(|| info.first_text(&["DTPlatformName"]));

    if let Some(platform) = platform {
        let family = PLATFORM_FAMILIES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&platform))
            .map(|(_, family)| family.to_string());
        return Some(family.unwrap_or(platform));
    }

    (info.contains_key("UIDeviceFamily") || info.contains_key("LSRequiresIPhoneOS")).then(|| "iOS".to_string())
}

/// Decode the top-level app's Info.plist, map it and resolve the icon
#[instrument(skip_all, fields(container = %container.label()))]
pub(crate) fn extract<R: Read + Seek>(
    container: &mut Container<R>,
    options: &ExtractOptions,
) -> ExtractResult<(ManifestFields, Option<ResolvedIcon>)> {
    let entry = container
        .find_matching(IOS_INFO_PLIST_PATTERN)
        .first()
        .map(|entry| (*entry).clone())
        .ok_or_else(|| ExtractError::malformed(container.label(), "no Payload/*.app/Info.plist entry"))?;
    let app_dir = entry.name.trim_end_matches("Info.plist").to_string();
    debug!(entry = %entry.name, "Using Info.plist");

    let data = container.read_index(entry.index)?;
    let info = decode_dictionary(&entry.name, &data)?;
    let fields = map_info_plist(&info);

    let icon = if options.resolve_icons {
        icon::ios::resolve(container, &app_dir, &info, options.max_icon_size)?
    } else {
        None
    };

    Ok((fields, icon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(pairs: &[(&str, ManifestValue)]) -> Dictionary {
        let mut dict = Dictionary::new();
        for (key, value) in pairs {
            dict.insert(*key, value.clone());
        }
        dict
    }

    fn text(s: &str) -> ManifestValue {
        ManifestValue::String(s.into())
    }

    #[test]
    fn test_map_info_plist() {
        let dict = info(&[
            ("CFBundleName", text("SoEntitled")),
            ("CFBundleIdentifier", text("com.microsoft.SoEntitled")),
            ("CFBundleShortVersionString", text("1.0")),
            ("CFBundleVersion", ManifestValue::Integer(1)),
            ("CFBundleExecutable", text("SoEntitled")),
            ("MinimumOSVersion", text("10.0")),
            ("CFBundleSupportedPlatforms", ManifestValue::Array(vec![text("iPhoneOS")])),
        ]);
        let fields = map_info_plist(&dict);
        assert_eq!(fields.display_name.as_deref(), Some("SoEntitled"));
        assert_eq!(fields.unique_identifier.as_deref(), Some("com.microsoft.SoEntitled"));
        assert_eq!(fields.version.as_deref(), Some("1.0"));
        assert_eq!(fields.build_version.as_deref(), Some("1"));
        assert_eq!(fields.executable_name.as_deref(), Some("SoEntitled"));
        assert_eq!(fields.minimum_os_version.as_deref(), Some("10.0"));
        assert_eq!(fields.device_family.as_deref(), Some("iOS"));
        assert!(fields.languages.is_empty());
    }

    #[test]
    fn test_display_name_prefers_display_key() {
        let dict = info(&[("CFBundleName", text("ApplicationInsights")), ("CFBundleDisplayName", text("App Insights"))]);
        assert_eq!(map_info_plist(&dict).display_name.as_deref(), Some("App Insights"));
    }

    #[test]
    fn test_absent_and_wrong_types_unset() {
        let dict = info(&[
            ("CFBundleIdentifier", ManifestValue::Dictionary(Dictionary::new())),
            ("CFBundleShortVersionString", text("")),
        ]);
        let fields = map_info_plist(&dict);
        assert_eq!(fields, ManifestFields::default());
    }

    #[test]
    fn test_device_family_sources() {
        let tv = info(&[("DTPlatformName", text("appletvos"))]);
        assert_eq!(device_family(&tv).as_deref(), Some("tvOS"));

        let mac = info(&[("LSMinimumSystemVersion", text("10.13")), ("CFBundleSupportedPlatforms", ManifestValue::Array(vec![text("MacOSX")]))]);
        assert_eq!(device_family(&mac).as_deref(), Some("macOS"));
        assert_eq!(map_info_plist(&mac).minimum_os_version.as_deref(), Some("10.13"));

        let other = info(&[("DTPlatformName", text("xros"))]);
        assert_eq!(device_family(&other).as_deref(), Some("xros"));

        let legacy = info(&[("UIDeviceFamily", ManifestValue::Array(vec![ManifestValue::Integer(1)]))]);
        assert_eq!(device_family(&legacy).as_deref(), Some("iOS"));

        assert_eq!(device_family(&Dictionary::new()), None);
    }
}
