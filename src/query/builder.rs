//! FetchXML builders and query URL construction

use super::params::FETCH_XML_PARAM;
use crate::error::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use url::Url;

/// Builds the FetchXML queries this exporter sends
pub struct FetchXmlBuilder;

impl FetchXmlBuilder {
    /// Audit log entries created in the last `last_days` days, joined with
    /// the acting user's full name, `page_size` entries per page.
    ///
    /// The result starts at `page="1"` with no paging cookie.
    pub fn audit_logs(last_days: u32, page_size: u32) -> Result<String> {
        let page_size = page_size.to_string();
        let last_days = last_days.to_string();
        let mut writer = Writer::new(Vec::new());

        emit(
            &mut writer,
            Event::Start(BytesStart::new("fetch").with_attributes([
                ("mapping", "logical"),
                ("page", "1"),
                ("count", page_size.as_str()),
            ])),
        )?;
        emit(
            &mut writer,
            Event::Start(BytesStart::new("entity").with_attributes([("name", "audit")])),
        )?;
        emit(
            &mut writer,
            Event::Empty(
                BytesStart::new("attribute")
                    .with_attributes([("name", "objectid"), ("alias", "objectid")]),
            ),
        )?;
        emit(
            &mut writer,
            Event::Empty(
                BytesStart::new("attribute")
                    .with_attributes([("name", "createdon"), ("value", "FormattedValue")]),
            ),
        )?;

        emit(
            &mut writer,
            Event::Start(BytesStart::new("link-entity").with_attributes([
                ("name", "systemuser"),
                ("to", "objectid"),
                ("link-type", "inner"),
            ])),
        )?;
        emit(
            &mut writer,
            Event::Empty(BytesStart::new("attribute").with_attributes([("name", "fullname")])),
        )?;
        emit(&mut writer, Event::End(BytesEnd::new("link-entity")))?;

        emit(
            &mut writer,
            Event::Start(BytesStart::new("filter").with_attributes([("type", "and")])),
        )?;
        emit(
            &mut writer,
            Event::Empty(BytesStart::new("condition").with_attributes([
                ("attribute", "createdon"),
                ("operator", "last-x-days"),
                ("value", last_days.as_str()),
            ])),
        )?;
        emit(&mut writer, Event::End(BytesEnd::new("filter")))?;

        emit(&mut writer, Event::End(BytesEnd::new("entity")))?;
        emit(&mut writer, Event::End(BytesEnd::new("fetch")))?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::Other(format!("FetchXML is not UTF-8: {e}")))
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Other(format!("Failed to write FetchXML: {e}")))
}

/// `<resource>/api/data/<version>/<entity-set>?fetchXml=<encoded document>`
pub fn query_url(resource: &str, api_version: &str, entity_set: &str, fetch_xml: &str) -> Result<Url> {
    let mut url = Url::parse(&format!(
        "{}/api/data/{}/{}",
        resource.trim_end_matches('/'),
        api_version.trim_matches('/'),
        entity_set.trim_matches('/'),
    ))?;
    url.set_query(Some(&format!(
        "{FETCH_XML_PARAM}={}",
        urlencoding::encode(fetch_xml)
    )));
    Ok(url)
}
