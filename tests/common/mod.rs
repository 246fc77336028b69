//! Fixture builders shared by the integration tests

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub fn zip_bytes(entries: &[(&str, Vec<u8>)], method: CompressionMethod) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        let options = SimpleFileOptions::default().compression_method(method);
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

/// PNG signature plus an `IHDR` chunk; enough for dimension ranking
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[8, 6, 0, 0, 0, 0, 0, 0, 0]);
    data
}

// =============================================================================
// Info.plist
// =============================================================================

pub fn info_plist() -> plist::Dictionary {
    let mut dict = plist::Dictionary::new();
    dict.insert("CFBundleName".into(), "SoEntitled".into());
    dict.insert("CFBundleIdentifier".into(), "com.microsoft.SoEntitled".into());
    dict.insert("CFBundleShortVersionString".into(), "1.0".into());
    dict.insert("CFBundleVersion".into(), "1".into());
    dict.insert("CFBundleExecutable".into(), "SoEntitled".into());
    dict.insert("MinimumOSVersion".into(), "10.0".into());
    dict.insert(
        "CFBundleSupportedPlatforms".into(),
        plist::Value::Array(vec!["iPhoneOS".into()]),
    );
    dict.insert(
        "UIDeviceFamily".into(),
        plist::Value::Array(vec![plist::Value::Integer(1.into())]),
    );
    dict
}

pub fn with_icon_files(mut dict: plist::Dictionary, names: &[&str]) -> plist::Dictionary {
    let files = plist::Value::Array(names.iter().map(|n| plist::Value::from(*n)).collect());
    let mut primary = plist::Dictionary::new();
    primary.insert("CFBundleIconFiles".into(), files);
    let mut icons = plist::Dictionary::new();
    icons.insert("CFBundlePrimaryIcon".into(), plist::Value::Dictionary(primary));
    dict.insert("CFBundleIcons".into(), plist::Value::Dictionary(icons));
    dict
}

pub fn plist_xml(dict: &plist::Dictionary) -> Vec<u8> {
    let mut buf = Vec::new();
    plist::Value::Dictionary(dict.clone()).to_writer_xml(&mut buf).unwrap();
    buf
}

pub fn plist_binary(dict: &plist::Dictionary) -> Vec<u8> {
    let mut buf = Vec::new();
    plist::Value::Dictionary(dict.clone()).to_writer_binary(&mut buf).unwrap();
    buf
}

// =============================================================================
// Windows manifests
// =============================================================================

pub fn appx_manifest(name: &str, version: &str, languages: &[&str]) -> Vec<u8> {
    let resources: String = languages
        .iter()
        .map(|lang| format!(r#"<Resource Language="{lang}"/>"#))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<Package xmlns="http://schemas.microsoft.com/appx/manifest/foundation/windows10"
         xmlns:uap="http://schemas.microsoft.com/appx/manifest/uap/windows10">
  <Identity Name="{name}" Publisher="CN=Test" Version="{version}"/>
  <Properties>
    <DisplayName>UwpApp</DisplayName>
    <Logo>Assets\StoreLogo.png</Logo>
  </Properties>
  <Dependencies>
    <TargetDeviceFamily Name="Windows.Universal" MinVersion="10.0.10240.0" MaxVersionTested="10.0.14393.0"/>
  </Dependencies>
  <Resources>{resources}</Resources>
  <Applications>
    <Application Id="App" Executable="UwpApp.exe" EntryPoint="UwpApp.App">
      <uap:VisualElements DisplayName="UwpApp" Square150x150Logo="Assets\Square150x150Logo.png"
                          Square44x44Logo="Assets\Square44x44Logo.png" Description="UwpApp" BackgroundColor="transparent">
        <uap:DefaultTile Wide310x150Logo="Assets\Wide310x150Logo.png" Square71x71Logo="Assets\SmallTile.png"/>
      </uap:VisualElements>
    </Application>
  </Applications>
</Package>"#
    )
    .into_bytes()
}

/// `(type, file name, languages)` per package
pub fn bundle_manifest(name: &str, version: &str, packages: &[(&str, &str, &[&str])]) -> Vec<u8> {
    let packages: String = packages
        .iter()
        .map(|(kind, file, languages)| {
            let resources: String = languages
                .iter()
                .map(|lang| format!(r#"<Resource Language="{lang}"/>"#))
                .collect();
            format!(r#"<Package Type="{kind}" FileName="{file}"><Resources>{resources}</Resources></Package>"#)
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Bundle xmlns="http://schemas.microsoft.com/appx/2013/bundle" SchemaVersion="2.0">
  <Identity Name="{name}" Publisher="CN=Test" Version="{version}"/>
  <Packages>{packages}</Packages>
</Bundle>"#
    )
    .into_bytes()
}

/// Bundle in the layout Visual Studio produces for a sideload package
pub fn uwp_bundle() -> Vec<u8> {
    let main = zip_bytes(
        &[
            ("AppxManifest.xml", appx_manifest("7b8e5825-5039-4f80-b71f-ac8f578f434e", "1.1.2.0", &["EN-US"])),
            ("Assets/SmallTile.scale-100.png", png(71, 71)),
            ("Assets/StoreLogo.png", png(50, 50)),
            ("UwpApp.exe", b"MZ".to_vec()),
        ],
        CompressionMethod::Deflated,
    );
    let scale400 = zip_bytes(
        &[
            ("AppxManifest.xml", b"<Package/>".to_vec()),
            ("Assets/smalltile.scale-400.png", png(284, 284)),
            ("Assets/StoreLogo.scale-400.png", png(200, 200)),
        ],
        CompressionMethod::Deflated,
    );
    let german = zip_bytes(&[("resources.pri", b"pri".to_vec())], CompressionMethod::Deflated);

    zip_bytes(
        &[
            (
                "AppxMetadata/AppxBundleManifest.xml",
                bundle_manifest(
                    "7b8e5825-5039-4f80-b71f-ac8f578f434e",
                    "1.1.2.0",
                    &[
                        ("application", "UwpApp_1.1.2.0_x86.appx", &["en-us"]),
                        ("resource", "UwpApp_1.1.2.0_scale-400.appx", &[]),
                        ("resource", "UwpApp_1.1.2.0_language-de.appx", &["de"]),
                    ],
                ),
            ),
            ("UwpApp_1.1.2.0_x86.appx", main),
            ("UwpApp_1.1.2.0_scale-400.appx", scale400),
            ("UwpApp_1.1.2.0_language-de.appx", german),
        ],
        CompressionMethod::Stored,
    )
}
