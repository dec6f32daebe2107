use std::fmt::Debug;

/// Looks up the authority code of a crs encoding.
pub trait CrsService: Debug + Send + Sync {
    /// Code the `authority` (e.g. "EPSG") assigns to the crs, if any.
    fn authority_code(&self, encoding: &str, authority: &str) -> Option<String>;
}

/// Reads authority tags straight out of the encoding.
///
/// Understands `EPSG:4326` style identifiers, WKT1 `AUTHORITY["EPSG","4326"]`
/// and WKT2 `ID["EPSG",4326]`. The last tag wins, which in WKT is the one
/// of the root node.
#[derive(Debug, Default, Clone, Copy)]
pub struct WktAuthority;

impl CrsService for WktAuthority {
    fn authority_code(&self, encoding: &str, authority: &str) -> Option<String> {
        let encoding = encoding.trim();
        if let Some((name, code)) = encoding.split_once(':') {
            if name.eq_ignore_ascii_case(authority) && !code.contains('[') {
                return Some(code.trim().to_string());
            }
        }
        ["AUTHORITY[", "ID["]
            .iter()
            .filter_map(|key| last_tag(encoding, key, authority))
            .max_by_key(|(position, _)| *position)
            .map(|(_, code)| code)
    }
}

// Position and code of the last `key"authority",code]` tag.
fn last_tag(wkt: &str, key: &str, authority: &str) -> Option<(usize, String)> {
    let prefix = format!("{key}\"{authority}\",");
    let upper = wkt.to_ascii_uppercase();
    let position = upper.rfind(&prefix.to_ascii_uppercase())?;
    let start = position + prefix.len();
    let end = start + wkt[start..].find([']', ','])?;
    let code = wkt[start..end].trim().trim_matches('"').to_string();
    Some((position, code))
}

#[cfg(feature = "gdal")]
pub use gdal_crs::GdalCrs;

#[cfg(feature = "gdal")]
mod gdal_crs {
    use super::*;
    use gdal::spatial_ref::SpatialRef;

    /// Resolves codes through GDAL/OGR spatial references.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct GdalCrs;

    impl CrsService for GdalCrs {
        fn authority_code(&self, encoding: &str, authority: &str) -> Option<String> {
            let spatial_ref = SpatialRef::from_definition(encoding).ok()?;
            let name = spatial_ref.auth_name().ok()?;
            if !name.eq_ignore_ascii_case(authority) {
                return None;
            }
            spatial_ref.auth_code().ok().map(|code| code.to_string())
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const WGS84_WKT1: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]]"#;

    const UTM_WKT2: &str = r#"PROJCRS["WGS 84 / UTM zone 33N",BASEGEOGCRS["WGS 84",ID["EPSG",4326]],CONVERSION["UTM zone 33N",ID["EPSG",16033]],CS[Cartesian,2],ID["EPSG",32633]]"#;

    #[rstest]
    #[case(WGS84_WKT1, Some("4326"))]
    #[case(UTM_WKT2, Some("32633"))]
    #[case("EPSG:3857", Some("3857"))]
    #[case("epsg:2154", Some("2154"))]
    #[case(r#"GEOGCS["WGS 84",DATUM["WGS_1984"]]"#, None)]
    #[case(r#"GEOGCS["x",AUTHORITY["ESRI","102100"]]"#, None)]
    #[case("", None)]
    fn wkt_authority_codes(#[case] encoding: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            WktAuthority.authority_code(encoding, "EPSG"),
            expected.map(String::from)
        );
    }
}
