//! Minimal readers for OGC XML documents.
//!
//! Elements are matched by local name, so `wfs:FeatureType`, `FeatureType`
//! and `ns0:FeatureType` are the same element here.

use quick_xml::events::Event;
use quick_xml::Reader;
use wlts_core::error::{Result, WltsError};

fn xml_error(e: impl std::fmt::Display) -> WltsError {
    WltsError::Serialization(format!("Invalid XML: {}", e))
}

/// Text of every element whose ancestry satisfies `wanted`
fn collect_texts(xml: &str, wanted: impl Fn(&[String]) -> bool) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut found = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Text(text)) if wanted(&path) => {
                found.push(text.unescape().map_err(xml_error)?.trim().to_string());
            }
            Ok(Event::CData(data)) if wanted(&path) => {
                found.push(String::from_utf8_lossy(&data.into_inner()).trim().to_string());
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
    }

    Ok(found)
}

fn ends_with(path: &[String], parent: &str, child: &str) -> bool {
    matches!(path, [.., p, c] if p == parent && c == child)
}

/// `<Name>` of every `<FeatureType>` in a WFS capabilities document
pub fn feature_type_names(xml: &str) -> Result<Vec<String>> {
    collect_texts(xml, |path| ends_with(path, "FeatureType", "Name"))
}

/// `<name>` of every `<CoverageOfferingBrief>` in a WCS 1.0 capabilities document
pub fn coverage_names(xml: &str) -> Result<Vec<String>> {
    collect_texts(xml, |path| ends_with(path, "CoverageOfferingBrief", "name"))
}

/// Text of the first element named `local_name`
pub fn first_element_text(xml: &str, local_name: &str) -> Result<Option<String>> {
    let local_name = local_name.rsplit(':').next().unwrap_or(local_name);
    Ok(collect_texts(xml, |path| path.last().is_some_and(|name| name == local_name))?
        .into_iter()
        .next())
}

/// Message of an OGC service exception report, if the document is one
pub fn service_exception(xml: &str) -> Option<String> {
    collect_texts(xml, |path| {
        path.last().is_some_and(|name| name == "ServiceException" || name == "ExceptionText")
    })
    .ok()
    .and_then(|messages| messages.into_iter().next())
}
