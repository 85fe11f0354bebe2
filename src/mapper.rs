// Vendor record to normalized listing transformation
//
// Mapping is best-effort per property: a failure here is counted by the
// import loop and never aborts the batch.
use crate::error::MapError;
use crate::listing::{NormalizedListing, PropertyType};
use crate::xml::{self, XmlValue};

pub fn map_property(
    record: &XmlValue,
    agent_email: Option<&str>,
) -> Result<NormalizedListing, MapError> {
    let prop = xml::get(record, "property")
        .ok_or_else(|| MapError("record has no property element".to_string()))?;

    let external_id = xml::get_text(prop, "id")
        .or_else(|| xml::get_text(prop, "propertyid"))
        .or_else(|| xml::get_text(prop, "prop_id"))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| MapError("property record carries no id".to_string()))?
        .to_string();

    let display = xml::get_text(prop, "address.display").unwrap_or("");
    let street = xml::get_text(prop, "address.street").unwrap_or("");

    let title = if !display.is_empty() {
        display.to_string()
    } else if !street.is_empty() {
        street.to_string()
    } else {
        "Property".to_string()
    };

    let (images, floorplans, virtual_tours) = partition_files(prop);

    let amenities = {
        let bullets: Vec<String> = xml::get_all(prop, "bullets.bullet")
            .iter()
            .filter_map(xml::text_of)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .collect();
        none_if_empty(bullets)
    };

    Ok(NormalizedListing {
        title,
        description: xml::get_text(prop, "description").unwrap_or("").to_string(),
        property_type: property_type(prop),
        street_address: street.to_string(),
        address: display.to_string(),
        city: xml::get_text(prop, "address.town").unwrap_or("").to_string(),
        postcode: xml::get_text(prop, "address.postcode").unwrap_or("").to_string(),
        latitude: parse_f64(prop, "latitude"),
        longitude: parse_f64(prop, "longitude"),
        bedrooms: parse_u32(prop, "bedrooms"),
        bathrooms: parse_u32(prop, "bathrooms"),
        price_monthly: parse_f64(prop, "price"),
        deposit_amount: parse_f64(prop, "deposit"),
        available_from: xml::get_text(prop, "available").unwrap_or("").to_string(),
        furnished: furnished(prop),
        // not sourced from the vendor feed
        bills_included: false,
        epc_rating: xml::get_text(prop, "epc.rating").map(str::to_string),
        council_tax_band: xml::get_text(prop, "council_tax.band").map(str::to_string),
        images,
        floorplans,
        virtual_tours,
        amenities,
        landlord_email: agent_email
            .filter(|email| !email.is_empty())
            .map(str::to_string),
        landlord_account_type: "agent".to_string(),
        status: "available".to_string(),
        external_id,
    })
}

// rm_type codes: the 1-6 range covers houses (detached through cottage),
// 9 is a studio, everything else falls back to flat.
fn property_type(prop: &XmlValue) -> PropertyType {
    let code = xml::get_text(prop, "rm_type")
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(0.0);

    if (1.0..=6.0).contains(&code) {
        PropertyType::House
    } else if code == 9.0 {
        PropertyType::Studio
    } else {
        PropertyType::Flat
    }
}

// Attachments partition by type code: "0" images, "2" floorplans,
// "3" virtual tours. Entries without a url are dropped.
fn partition_files(
    prop: &XmlValue,
) -> (
    Option<Vec<String>>,
    Option<Vec<String>>,
    Option<Vec<String>>,
) {
    let mut images = Vec::new();
    let mut floorplans = Vec::new();
    let mut virtual_tours = Vec::new();

    for file in xml::get_all(prop, "files.file") {
        let Some(url) = xml::get_text(file, "url").filter(|url| !url.is_empty()) else {
            continue;
        };
        match xml::get_text(file, "type").map(str::trim) {
            Some("0") => images.push(url.to_string()),
            Some("2") => floorplans.push(url.to_string()),
            Some("3") => virtual_tours.push(url.to_string()),
            _ => {}
        }
    }

    (
        none_if_empty(images),
        none_if_empty(floorplans),
        none_if_empty(virtual_tours),
    )
}

fn furnished(prop: &XmlValue) -> bool {
    match xml::get_text(prop, "furnished") {
        None => false,
        Some(value) => {
            let value = value.trim().to_lowercase();
            !(value.is_empty() || value == "0" || value == "false" || value.starts_with("un"))
        }
    }
}

fn parse_f64(prop: &XmlValue, path: &str) -> Option<f64> {
    xml::get_text(prop, path).and_then(|s| s.trim().parse().ok())
}

fn parse_u32(prop: &XmlValue, path: &str) -> u32 {
    xml::get_text(prop, path)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn none_if_empty(items: Vec<String>) -> Option<Vec<String>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_xml;
    use test_case::test_case;

    fn record(body: &str) -> XmlValue {
        parse_xml(&format!(r#"<property id="77">{body}</property>"#)).unwrap()
    }

    #[test_case("<rm_type>1</rm_type>", PropertyType::House; "one is a house")]
    #[test_case("<rm_type>3</rm_type>", PropertyType::House; "three is a house")]
    #[test_case("<rm_type>6</rm_type>", PropertyType::House; "six is a house")]
    #[test_case("<rm_type>9</rm_type>", PropertyType::Studio; "nine is a studio")]
    #[test_case("<rm_type>20</rm_type>", PropertyType::Flat; "twenty is a flat")]
    #[test_case("<rm_type>bogus</rm_type>", PropertyType::Flat; "unparsable is a flat")]
    #[test_case("", PropertyType::Flat; "absent is a flat")]
    fn test_property_type_codes(body: &str, expected: PropertyType) {
        let listing = map_property(&record(body), None).unwrap();
        assert_eq!(listing.property_type, expected);
    }

    #[test]
    fn test_files_partition_by_type_code() {
        let listing = map_property(
            &record(
                r#"
                <files>
                    <file type="0"><url>http://x/img1.jpg</url></file>
                    <file type="0"><url>http://x/img2.jpg</url></file>
                    <file type="2"><url>http://x/plan.pdf</url></file>
                    <file type="3"><url>http://x/tour</url></file>
                    <file type="7"><url>http://x/brochure.pdf</url></file>
                    <file type="0"></file>
                </files>
                "#,
            ),
            None,
        )
        .unwrap();

        assert_eq!(
            listing.images,
            Some(vec![
                "http://x/img1.jpg".to_string(),
                "http://x/img2.jpg".to_string()
            ])
        );
        assert_eq!(listing.floorplans, Some(vec!["http://x/plan.pdf".to_string()]));
        assert_eq!(listing.virtual_tours, Some(vec!["http://x/tour".to_string()]));
    }

    #[test]
    fn test_file_without_url_is_dropped() {
        let listing = map_property(
            &record(r#"<files><file type="0"></file><file type="0"><url></url></file></files>"#),
            None,
        )
        .unwrap();

        assert_eq!(listing.images, None);
    }

    #[test]
    fn test_amenities_come_from_bullets() {
        let listing = map_property(
            &record("<bullets><bullet>Gas central heating</bullet><bullet>Garden</bullet></bullets>"),
            None,
        )
        .unwrap();

        assert_eq!(
            listing.amenities,
            Some(vec![
                "Gas central heating".to_string(),
                "Garden".to_string()
            ])
        );
    }

    #[test]
    fn test_title_falls_back_from_display_to_street_to_literal() {
        let with_display = record(
            "<address><display>5 High St, York</display><street>High St</street></address>",
        );
        assert_eq!(
            map_property(&with_display, None).unwrap().title,
            "5 High St, York"
        );

        let street_only = record("<address><street>High St</street></address>");
        assert_eq!(map_property(&street_only, None).unwrap().title, "High St");

        let neither = record("<bedrooms>2</bedrooms>");
        assert_eq!(map_property(&neither, None).unwrap().title, "Property");
    }

    #[test]
    fn test_numeric_defaults_and_price_text_content() {
        let listing = map_property(
            &record(
                r#"
                <price qualifier="pcm" currency="GBP">650</price>
                <bedrooms>4</bedrooms>
                <latitude>54.778</latitude>
                <longitude>-1.571</longitude>
                "#,
            ),
            None,
        )
        .unwrap();

        assert_eq!(listing.price_monthly, Some(650.0));
        assert_eq!(listing.bedrooms, 4);
        assert_eq!(listing.bathrooms, 0);
        assert_eq!(listing.latitude, Some(54.778));
        assert_eq!(listing.longitude, Some(-1.571));
        assert_eq!(listing.deposit_amount, None);
    }

    #[test]
    fn test_unparsable_price_is_omitted() {
        let listing = map_property(&record("<price>POA</price>"), None).unwrap();
        assert_eq!(listing.price_monthly, None);
    }

    #[test]
    fn test_agent_email_becomes_landlord_email() {
        let listing = map_property(&record(""), Some("agent@lettings.example")).unwrap();
        assert_eq!(
            listing.landlord_email,
            Some("agent@lettings.example".to_string())
        );
        assert_eq!(listing.landlord_account_type, "agent");

        let without = map_property(&record(""), None).unwrap();
        assert_eq!(without.landlord_email, None);
    }

    #[test]
    fn test_furnished_flag_coercion() {
        assert!(map_property(&record("<furnished>Furnished</furnished>"), None)
            .unwrap()
            .furnished);
        assert!(!map_property(&record("<furnished>Un-Furnished</furnished>"), None)
            .unwrap()
            .furnished);
        assert!(!map_property(&record("<furnished>0</furnished>"), None)
            .unwrap()
            .furnished);
        assert!(!map_property(&record(""), None).unwrap().furnished);
    }

    #[test]
    fn test_record_without_property_element_is_an_error() {
        let doc = parse_xml("<listing><id>1</id></listing>").unwrap();
        assert!(map_property(&doc, None).is_err());
    }

    #[test]
    fn test_record_without_id_is_an_error() {
        let doc = parse_xml("<property><bedrooms>3</bedrooms></property>").unwrap();
        assert!(map_property(&doc, None).is_err());
    }

    #[test]
    fn test_empty_optional_arrays_are_omitted_from_json() {
        let listing = map_property(&record("<bedrooms>3</bedrooms>"), None).unwrap();
        let json = serde_json::to_value(&listing).unwrap();
        let object = json.as_object().unwrap();

        assert!(!object.contains_key("images"));
        assert!(!object.contains_key("floorplans"));
        assert!(!object.contains_key("virtual_tours"));
        assert!(!object.contains_key("amenities"));
        assert!(!object.contains_key("landlord_email"));
        assert_eq!(json["bills_included"], serde_json::json!(false));
        assert_eq!(json["status"], serde_json::json!("available"));
        assert_eq!(json["external_id"], serde_json::json!("77"));
    }
}
