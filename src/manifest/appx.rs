//! Windows package manifests
//!
//! Two documents share this module:
//!
//! - `AppxManifest.xml` at the root of every APPX:
//!   ```xml
//!   <Package>
//!     <Identity Name="..." Version="..."/>
//!     <Properties><DisplayName>...</DisplayName><Logo>Assets\StoreLogo.png</Logo></Properties>
//!     <Dependencies><TargetDeviceFamily Name="Windows.Universal" MinVersion="..."/></Dependencies>
//!     <Resources><Resource Language="EN-US"/></Resources>
//!     <Applications><Application Executable="App.exe">
//!       <uap:VisualElements Square44x44Logo="..."><uap:DefaultTile Square71x71Logo="..."/></uap:VisualElements>
//!     </Application></Applications>
//!   </Package>
//!   ```
//! - `AppxMetadata/AppxBundleManifest.xml` inside an APPXBUNDLE:
//!   ```xml
//!   <Bundle>
//!     <Identity Name="..." Version="..."/>
//!     <Packages>
//!       <Package Type="application" FileName="App_x86.appx"><Resources>...</Resources></Package>
//!       <Package Type="resource" FileName="App_language-de.appx" ResourceId="split.language-de">...</Package>
//!     </Packages>
//!   </Bundle>
//!   ```
//!
//! Documents are first parsed into a generic [`XmlElement`] tree, keyed by
//! local name so the `uap:`/`m2:` namespace prefixes of different schema
//! versions do not matter.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::trace;

use crate::error::{ExtractError, ExtractResult};

pub const APPX_MANIFEST_PATH: &str = "AppxManifest.xml";
pub const APPX_BUNDLE_MANIFEST_PATH: &str = "AppxMetadata/AppxBundleManifest.xml";

// =============================================================================
// Generic element tree
// =============================================================================

/// One XML element, keyed by local name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    fn from_start(source: &str, start: &BytesStart<'_>) -> ExtractResult<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| ExtractError::malformed(source, e))?;
            let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| ExtractError::malformed(source, e))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self { name, attributes, ..Self::default() })
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed attribute value; empty counts as absent
    pub fn attr_value(&self, name: &str) -> Option<String> {
        self.attr(name).map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Trimmed text content; empty counts as absent
    pub fn text_value(&self) -> Option<String> {
        let text = self.text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Parse an XML document into its root element
pub fn parse_document(source: &str, data: &[u8]) -> ExtractResult<XmlElement> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => stack.push(XmlElement::from_start(source, e)?),
            Ok(Event::Empty(ref e)) => {
                let element = XmlElement::from_start(source, e)?;
                attach(source, &mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ExtractError::malformed(source, "unbalanced end tag"))?;
                attach(source, &mut stack, &mut root, element)?;
            }
            Ok(Event::Text(ref e)) => {
                if let Some(current) = stack.last_mut() {
                    let text = e.unescape().map_err(|e| ExtractError::malformed(source, e))?;
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::malformed(
                    source,
                    format!("XML error at byte {}: {e}", reader.buffer_position()),
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ExtractError::malformed(source, format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| ExtractError::malformed(source, "document has no root element"))
}

fn attach(
    source: &str,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> ExtractResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => {
            return Err(ExtractError::malformed(source, "more than one root element"));
        }
        None => *root = Some(element),
    }
    Ok(())
}

// =============================================================================
// AppxManifest.xml
// =============================================================================

/// Fields read from an APPX package manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppxManifest {
    /// `Identity@Name`
    pub name: String,
    /// `Identity@Version`
    pub version: String,
    pub display_name: Option<String>,
    pub executable: Option<String>,
    pub min_version: Option<String>,
    /// Declared logo/tile asset paths, most preferred first
    pub logo_seeds: Vec<String>,
    /// Lower-cased, deduplicated, document order
    pub languages: Vec<String>,
}

#[derive(Clone, Copy)]
enum LogoSource {
    DefaultTile,
    VisualElements,
}

/// Logo attributes in icon preference order; `Properties/Logo` comes last
const LOGO_ATTRIBUTES: &[(LogoSource, &str)] = &[
    (LogoSource::DefaultTile, "Square71x71Logo"),
    (LogoSource::DefaultTile, "Square70x70Logo"),
    (LogoSource::VisualElements, "Square44x44Logo"),
    (LogoSource::VisualElements, "Square30x30Logo"),
    (LogoSource::VisualElements, "Square150x150Logo"),
    (LogoSource::VisualElements, "SmallLogo"),
    (LogoSource::VisualElements, "Logo"),
    (LogoSource::DefaultTile, "Square310x310Logo"),
    (LogoSource::DefaultTile, "Wide310x150Logo"),
];

pub fn parse_package_manifest(source: &str, data: &[u8]) -> ExtractResult<AppxManifest> {
    let root = parse_document(source, data)?;
    expect_root(source, &root, "Package")?;
    let (name, version) = identity(source, &root)?;

    let properties = root.child("Properties");
    let display_name = properties
        .and_then(|p| p.child("DisplayName"))
        .and_then(XmlElement::text_value);

    let application = root
        .child("Applications")
        .and_then(|apps| apps.child("Application"));
    let executable = application.and_then(|app| app.attr_value("Executable"));

    // Windows 10 declares TargetDeviceFamily; Windows 8.x used Prerequisites
    let min_version = root
        .child("Dependencies")
        .and_then(|deps| deps.child("TargetDeviceFamily"))
        .and_then(|family| family.attr_value("MinVersion"))
        .or_else(|| {
            root.child("Prerequisites")
                .and_then(|pre| pre.child("OSMinVersion"))
                .and_then(XmlElement::text_value)
        });

    let logo_seeds = logo_seeds(application, properties);
    let languages = collect_languages(root.child("Resources"), Vec::new());

    trace!(source, name = %name, version = %version, seeds = ?logo_seeds, "Parsed package manifest");

    Ok(AppxManifest {
        name,
        version,
        display_name,
        executable,
        min_version,
        logo_seeds,
        languages,
    })
}

fn logo_seeds(application: Option<&XmlElement>, properties: Option<&XmlElement>) -> Vec<String> {
    let visual = application.and_then(|app| app.child("VisualElements"));
    let tile = visual.and_then(|v| v.child("DefaultTile"));

    let declared = LOGO_ATTRIBUTES
        .iter()
        .filter_map(|(source, attribute)| {
            let element = match source {
                LogoSource::DefaultTile => tile,
                LogoSource::VisualElements => visual,
            };
            element.and_then(|e| e.attr_value(attribute))
        })
        .chain(
            properties
                .and_then(|p| p.child("Logo"))
                .and_then(XmlElement::text_value),
        );

    let mut seeds: Vec<String> = Vec::new();
    for seed in declared {
        if !seeds.iter().any(|known| known.eq_ignore_ascii_case(&seed)) {
            seeds.push(seed);
        }
    }
    seeds
}

// =============================================================================
// AppxBundleManifest.xml
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BundlePackageType {
    Application,
    #[default]
    Resource,
}

/// One `Packages/Package` entry of a bundle manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePackage {
    pub package_type: BundlePackageType,
    pub file_name: String,
    pub languages: Vec<String>,
}

/// Fields read from an APPX bundle manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleManifest {
    pub name: String,
    pub version: String,
    pub packages: Vec<BundlePackage>,
}

impl BundleManifest {
    pub fn application_packages(&self) -> impl Iterator<Item = &BundlePackage> {
        self.packages
            .iter()
            .filter(|package| package.package_type == BundlePackageType::Application)
    }

    /// Languages of the resource packages, falling back to every package
    pub fn languages(&self) -> Vec<String> {
        let has_resources = self
            .packages
            .iter()
            .any(|package| package.package_type == BundlePackageType::Resource);

        let mut languages = Vec::new();
        for package in &self.packages {
            if has_resources && package.package_type != BundlePackageType::Resource {
                continue;
            }
            for language in &package.languages {
                push_unique(&mut languages, language);
            }
        }
        languages
    }
}

pub fn parse_bundle_manifest(source: &str, data: &[u8]) -> ExtractResult<BundleManifest> {
    let root = parse_document(source, data)?;
    expect_root(source, &root, "Bundle")?;
    let (name, version) = identity(source, &root)?;

    let mut packages = Vec::new();
    if let Some(list) = root.child("Packages") {
        for package in list.children_named("Package") {
            let Some(file_name) = package.attr_value("FileName") else {
                trace!(source, "Skipping bundle package without FileName");
                continue;
            };
            let package_type = match package.attr_value("Type").map(|t| t.to_ascii_lowercase()).as_deref() {
                Some("application") => BundlePackageType::Application,
                _ => BundlePackageType::Resource,
            };
            packages.push(BundlePackage {
                package_type,
                file_name,
                languages: collect_languages(package.child("Resources"), Vec::new()),
            });
        }
    }

    trace!(source, name = %name, version = %version, packages = packages.len(), "Parsed bundle manifest");

    Ok(BundleManifest { name, version, packages })
}

// =============================================================================
// Shared helpers
// =============================================================================

fn expect_root(source: &str, root: &XmlElement, expected: &str) -> ExtractResult<()> {
    if root.name != expected {
        return Err(ExtractError::malformed(
            source,
            format!("root element is <{}>, expected <{}>", root.name, expected),
        ));
    }
    Ok(())
}

fn identity(source: &str, root: &XmlElement) -> ExtractResult<(String, String)> {
    let identity = root
        .child("Identity")
        .ok_or_else(|| ExtractError::malformed(source, "missing <Identity> element"))?;
    let name = identity
        .attr_value("Name")
        .ok_or_else(|| ExtractError::malformed(source, "missing Identity@Name"))?;
    let version = identity
        .attr_value("Version")
        .ok_or_else(|| ExtractError::malformed(source, "missing Identity@Version"))?;
    Ok((name, version))
}

fn collect_languages(resources: Option<&XmlElement>, mut languages: Vec<String>) -> Vec<String> {
    if let Some(resources) = resources {
        for resource in resources.children_named("Resource") {
            if let Some(language) = resource.attr_value("Language") {
                push_unique(&mut languages, &language);
            }
        }
    }
    languages
}

fn push_unique(languages: &mut Vec<String>, language: &str) {
    let tag = language.to_ascii_lowercase();
    if !languages.contains(&tag) {
        languages.push(tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const PACKAGE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Package xmlns="http://schemas.microsoft.com/appx/manifest/foundation/windows10"
         xmlns:uap="http://schemas.microsoft.com/appx/manifest/uap/windows10">
  <Identity Name="7b8e5825-5039-4f80-b71f-ac8f578f434e" Publisher="CN=test" Version="1.1.2.0" />
  <Properties>
    <DisplayName>UwpApp &amp; Friends</DisplayName>
    <Logo>Assets\StoreLogo.png</Logo>
  </Properties>
  <Dependencies>
    <TargetDeviceFamily Name="Windows.Universal" MinVersion="10.0.10240.0" MaxVersionTested="10.0.14393.0" />
  </Dependencies>
  <Resources>
    <Resource Language="EN-US" />
    <Resource Language="de-DE" />
    <Resource Language="en-us" />
    <Resource uap:Scale="400" />
  </Resources>
  <Applications>
    <Application Id="App" Executable="UwpApp.exe" EntryPoint="UwpApp.App">
      <uap:VisualElements DisplayName="UwpApp" Square150x150Logo="Assets\Square150x150Logo.png"
                          Square44x44Logo="Assets\Square44x44Logo.png" Description="UwpApp" BackgroundColor="transparent">
        <uap:DefaultTile Wide310x150Logo="Assets\Wide310x150Logo.png" Square71x71Logo="Assets\SmallTile.png" />
      </uap:VisualElements>
    </Application>
  </Applications>
</Package>"#;

    const BUNDLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Bundle xmlns="http://schemas.microsoft.com/appx/2013/bundle" SchemaVersion="2.0">
  <Identity Name="61908RichardWalters.Calculator" Publisher="CN=test" Version="2016.1003.2115.0"/>
  <Packages>
    <Package Type="application" Version="2016.1003.2115.0" Architecture="x86" FileName="Calculator_x86.appx" Offset="57" Size="100">
      <Resources><Resource Language="EN-US"/></Resources>
    </Package>
    <Package Type="resource" FileName="Calculator_language-de.appx" ResourceId="split.language-de">
      <Resources><Resource Language="DE"/></Resources>
    </Package>
    <Package Type="resource" FileName="Calculator_language-zh-hans.appx" ResourceId="split.language-zh-hans">
      <Resources><Resource Language="ZH-HANS"/><Resource Language="de"/></Resources>
    </Package>
    <Package FileName="Calculator_scale-400.appx" ResourceId="split.scale-400">
      <Resources><Resource Scale="400"/></Resources>
    </Package>
  </Packages>
</Bundle>"#;

    #[test]
    fn test_parse_package_manifest() {
        let manifest = parse_package_manifest("AppxManifest.xml", PACKAGE.as_bytes()).unwrap();
        assert_eq!(manifest.name, "7b8e5825-5039-4f80-b71f-ac8f578f434e");
        assert_eq!(manifest.version, "1.1.2.0");
        assert_eq!(manifest.display_name.as_deref(), Some("UwpApp & Friends"));
        assert_eq!(manifest.executable.as_deref(), Some("UwpApp.exe"));
        assert_eq!(manifest.min_version.as_deref(), Some("10.0.10240.0"));
        assert_eq!(manifest.languages, vec!["en-us", "de-de"]);
        assert_eq!(
            manifest.logo_seeds,
            vec![
                r"Assets\SmallTile.png",
                r"Assets\Square44x44Logo.png",
                r"Assets\Square150x150Logo.png",
                r"Assets\Wide310x150Logo.png",
                r"Assets\StoreLogo.png",
            ]
        );
    }

    #[test]
    fn test_parse_bundle_manifest() {
        let bundle = parse_bundle_manifest(APPX_BUNDLE_MANIFEST_PATH, BUNDLE.as_bytes()).unwrap();
        assert_eq!(bundle.name, "61908RichardWalters.Calculator");
        assert_eq!(bundle.version, "2016.1003.2115.0");
        assert_eq!(bundle.packages.len(), 4);
        assert_eq!(bundle.packages[3].package_type, BundlePackageType::Resource);

        let apps: Vec<&str> = bundle.application_packages().map(|p| p.file_name.as_str()).collect();
        assert_eq!(apps, vec!["Calculator_x86.appx"]);

        // Resource packages only, lower-cased, first-seen order
        assert_eq!(bundle.languages(), vec!["de", "zh-hans"]);
    }

    #[test]
    fn test_bundle_languages_without_resource_packages() {
        let xml = r#"<Bundle><Identity Name="A" Version="1.0.0.0"/><Packages>
            <Package Type="application" FileName="a.appx"><Resources><Resource Language="FR"/></Resources></Package>
            <Package Type="application" FileName="b.appx"><Resources><Resource Language="fr"/><Resource Language="IT"/></Resources></Package>
        </Packages></Bundle>"#;
        let bundle = parse_bundle_manifest("bundle", xml.as_bytes()).unwrap();
        assert_eq!(bundle.languages(), vec!["fr", "it"]);
    }

    #[test]
    fn test_windows8_manifest() {
        let xml = r#"<Package xmlns:m2="http://schemas.microsoft.com/appx/2013/manifest">
          <Identity Name="Contoso.App" Version="2.0.0.0"/>
          <Prerequisites><OSMinVersion>6.3.0</OSMinVersion></Prerequisites>
          <Applications><Application Executable="App.exe">
            <m2:VisualElements Square150x150Logo="Assets\Logo.png" Square30x30Logo="Assets\SmallLogo.png">
              <m2:DefaultTile Square70x70Logo="Assets\Square70.png"/>
            </m2:VisualElements>
          </Application></Applications>
        </Package>"#;
        let manifest = parse_package_manifest("AppxManifest.xml", xml.as_bytes()).unwrap();
        assert_eq!(manifest.min_version.as_deref(), Some("6.3.0"));
        assert_eq!(manifest.display_name, None);
        assert!(manifest.languages.is_empty());
        assert_eq!(
            manifest.logo_seeds,
            vec![r"Assets\Square70.png", r"Assets\SmallLogo.png", r"Assets\Logo.png"]
        );
    }

    #[test]
    fn test_missing_identity() {
        let err = parse_package_manifest("AppxManifest.xml", b"<Package><Properties/></Package>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedManifest);
        assert!(err.to_string().contains("Identity"));

        let err = parse_package_manifest("AppxManifest.xml", br#"<Package><Identity Name="A"/></Package>"#).unwrap_err();
        assert!(err.to_string().contains("Identity@Version"));
    }

    #[test]
    fn test_wrong_root() {
        let err = parse_package_manifest("AppxManifest.xml", BUNDLE.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("expected <Package>"));
    }

    #[test]
    fn test_unparsable_xml() {
        for data in [
            &b"<Package><Identity Name='A' Version='1'></Package>"[..],
            &b"<Package><Identity Name='A' Version='1'/>"[..],
            &b""[..],
            &b"<Package/><Package/>"[..],
        ] {
            let err = parse_package_manifest("AppxManifest.xml", data).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedManifest);
        }
    }

    #[test]
    fn test_element_tree() {
        let root = parse_document("doc", b"<a x=\"1\"><b>hi</b><b/><c><![CDATA[raw]]></c></a>").unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.attr("x"), Some("1"));
        assert_eq!(root.children_named("b").count(), 2);
        assert_eq!(root.child("b").and_then(XmlElement::text_value).as_deref(), Some("hi"));
        assert_eq!(root.child("c").map(|c| c.text.as_str()), Some("raw"));
    }
}
