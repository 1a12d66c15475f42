use xml::reader::{EventReader, XmlEvent};
use xml::writer::{EmitterConfig, XmlEvent as WriterEvent};

use crate::{Error, Result};

/// GDAL metadata item as stored in the GDAL_METADATA tiff tag (42112)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GdalMetadataItem {
    pub name: String,
    pub domain: Option<String>,
    /// The band index (0-based) for band specific items
    pub sample: Option<u32>,
    pub value: String,
}

impl GdalMetadataItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        GdalMetadataItem {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Marks the overviews as built with nearest neighbour resampling, the way rasterio records it
    pub fn nearest_overview_resampling() -> Self {
        GdalMetadataItem::new("resampling", "nearest").with_domain("rio_overview")
    }
}

// GDAL metadata format:
// <GDALMetadata>
//   <Item name="STATISTICS_MAXIMUM" sample="0">254</Item>
//   <Item name="resampling" domain="rio_overview">nearest</Item>
// </GDALMetadata>

/// Parses the items of a GDAL metadata XML document
pub fn parse_gdal_metadata(xml: &str) -> Result<Vec<GdalMetadataItem>> {
    let mut items = Vec::new();
    let mut current: Option<GdalMetadataItem> = None;

    for e in EventReader::from_str(xml) {
        match e {
            Ok(XmlEvent::StartElement { name, attributes, .. }) if name.local_name == "Item" => {
                let mut item = GdalMetadataItem::default();
                for attr in attributes {
                    match attr.name.local_name.as_str() {
                        "name" => item.name = attr.value,
                        "domain" => item.domain = Some(attr.value),
                        "sample" => item.sample = attr.value.parse::<u32>().ok(),
                        _ => {}
                    }
                }
                current = Some(item);
            }
            Ok(XmlEvent::Characters(data)) => {
                if let Some(item) = current.as_mut() {
                    item.value.push_str(&data);
                }
            }
            Ok(XmlEvent::EndElement { name }) if name.local_name == "Item" => {
                if let Some(item) = current.take() {
                    items.push(item);
                }
            }
            Err(e) => {
                return Err(Error::Runtime(format!("Failed to parse GDAL metadata: {e}")));
            }
            _ => {}
        }
    }

    Ok(items)
}

/// Serializes the items as a GDAL metadata XML document
pub fn gdal_metadata_xml(items: &[GdalMetadataItem]) -> Result<String> {
    let xml_err = |e: xml::writer::Error| Error::Runtime(format!("Failed to write GDAL metadata: {e}"));

    let mut buffer = Vec::new();
    let mut writer = EmitterConfig::new()
        .perform_indent(true)
        .write_document_declaration(false)
        .create_writer(&mut buffer);

    writer.write(WriterEvent::start_element("GDALMetadata")).map_err(xml_err)?;
    for item in items {
        let sample = item.sample.map(|sample| sample.to_string());

        let mut element = WriterEvent::start_element("Item").attr("name", &item.name);
        if let Some(domain) = &item.domain {
            element = element.attr("domain", domain);
        }
        if let Some(sample) = &sample {
            element = element.attr("sample", sample);
        }

        writer.write(element).map_err(xml_err)?;
        writer.write(WriterEvent::characters(&item.value)).map_err(xml_err)?;
        writer.write(WriterEvent::end_element()).map_err(xml_err)?;
    }
    writer.write(WriterEvent::end_element()).map_err(xml_err)?;

    String::from_utf8(buffer).map_err(|e| Error::Runtime(format!("Invalid GDAL metadata encoding: {e}")))
}

/// Looks up the value of an item by name and domain
pub fn metadata_value<'a>(items: &'a [GdalMetadataItem], name: &str, domain: Option<&str>) -> Option<&'a str> {
    items
        .iter()
        .find(|item| item.name == name && item.domain.as_deref() == domain)
        .map(|item| item.value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_items() -> Result<()> {
        let xml = r#"<GDALMetadata>
  <Item name="STATISTICS_MAXIMUM" sample="0">254</Item>
  <Item name="resampling" domain="rio_overview">nearest</Item>
  <Item name="EMPTY" />
</GDALMetadata>"#;

        let items = parse_gdal_metadata(xml)?;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].sample, Some(0));
        assert_eq!(metadata_value(&items, "STATISTICS_MAXIMUM", None), Some("254"));
        assert_eq!(metadata_value(&items, "resampling", Some("rio_overview")), Some("nearest"));
        assert_eq!(metadata_value(&items, "resampling", None), None);
        assert_eq!(metadata_value(&items, "EMPTY", None), Some(""));
        Ok(())
    }

    #[test]
    fn written_xml_parses_back() -> Result<()> {
        let items = vec![
            GdalMetadataItem::nearest_overview_resampling(),
            GdalMetadataItem {
                name: "LABEL".into(),
                domain: None,
                sample: Some(0),
                value: "Rice & <wheat>".into(),
            },
        ];

        let xml = gdal_metadata_xml(&items)?;
        assert!(xml.contains(r#"<Item name="resampling" domain="rio_overview">nearest</Item>"#));
        assert_eq!(parse_gdal_metadata(&xml)?, items);
        Ok(())
    }

    #[test]
    fn invalid_xml() {
        assert!(parse_gdal_metadata("<GDALMetadata><Item name=\"a\">1</GDALMetadata>").is_err());
    }
}
