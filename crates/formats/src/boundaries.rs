use serde_json::{Map, Value};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }
}

/// Outer ring first, holes after.
pub type Polygon = Vec<Vec<GeoPoint>>;

/// Boundary of one named region, possibly made of several polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionBoundary {
    pub name: String,
    pub polygons: Vec<Polygon>,
}

impl RegionBoundary {
    pub fn points(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.polygons
            .iter()
            .flat_map(|poly| poly.iter().flat_map(|ring| ring.iter().copied()))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryCollection {
    pub regions: Vec<RegionBoundary>,
}

#[derive(Debug)]
pub enum BoundaryError {
    Json(serde_json::Error),
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryError::Json(e) => write!(f, "JSON parse error: {e}"),
            BoundaryError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            BoundaryError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for BoundaryError {}

impl BoundaryCollection {
    /// Parse a GeoJSON FeatureCollection of (Multi)Polygon features named by `name_property`.
    ///
    /// Features sharing a name are merged into one region, keeping first-seen order.
    pub fn from_geojson_str(payload: &str, name_property: &str) -> Result<Self, BoundaryError> {
        let value: Value = serde_json::from_str(payload).map_err(BoundaryError::Json)?;
        Self::from_geojson_value(&value, name_property)
    }

    pub fn from_geojson_value(value: &Value, name_property: &str) -> Result<Self, BoundaryError> {
        let obj = value
            .as_object()
            .ok_or(BoundaryError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(BoundaryError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(BoundaryError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(BoundaryError::NotAFeatureCollection)?;

        let mut out = BoundaryCollection::default();
        for (index, feat_val) in features_val.iter().enumerate() {
            let invalid = |reason: String| BoundaryError::InvalidFeature { index, reason };
            let feat_obj = feat_val
                .as_object()
                .ok_or_else(|| invalid("feature must be an object".to_string()))?;

            let feat_type = feat_obj
                .get("type")
                .and_then(|v| v.as_str())
                .ok_or_else(|| invalid("feature missing type".to_string()))?;
            if feat_type != "Feature" {
                return Err(invalid(format!("unexpected feature type: {feat_type}")));
            }

            let name = feature_name(feat_obj, name_property)
                .ok_or_else(|| invalid(format!("feature missing {name_property:?} property")))?;

            let geometry_val = feat_obj
                .get("geometry")
                .ok_or_else(|| invalid("feature missing geometry".to_string()))?;
            let polygons = parse_area_geometry(geometry_val).map_err(invalid)?;

            out.push(name, polygons);
        }

        Ok(out)
    }

    fn push(&mut self, name: String, polygons: Vec<Polygon>) {
        match self.regions.iter_mut().find(|r| r.name == name) {
            Some(existing) => existing.polygons.extend(polygons),
            None => self.regions.push(RegionBoundary { name, polygons }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RegionBoundary> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

fn feature_name(feat_obj: &Map<String, Value>, name_property: &str) -> Option<String> {
    match feat_obj.get("properties")?.as_object()?.get(name_property)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_area_geometry(value: &Value) -> Result<Vec<Polygon>, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Polygon" => Ok(vec![parse_polygon(coords)?]),
        "MultiPolygon" => parse_multi_polygon(coords),
        other => Err(format!("unsupported region geometry type: {other}")),
    }
}

fn parse_point(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(GeoPoint::new(lon, lat))
}

fn parse_ring(coords: &Value) -> Result<Vec<GeoPoint>, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array of positions".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_point(item)?);
    }
    Ok(out)
}

fn parse_polygon(coords: &Value) -> Result<Polygon, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        out.push(parse_ring(ring)?);
    }
    Ok(out)
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Polygon>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    let mut out = Vec::with_capacity(polys.len());
    for poly in polys {
        out.push(parse_polygon(poly)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{BoundaryCollection, BoundaryError};

    const TWO_REGIONS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"NAME_1": "Kiev"},
             "geometry": {"type": "Polygon", "coordinates": [[[30,50],[31,50],[31,51],[30,50]]]}},
            {"type": "Feature", "properties": {"NAME_1": "Odessa"},
             "geometry": {"type": "MultiPolygon", "coordinates": [
                [[[29,46],[30,46],[30,47],[29,46]]],
                [[[31,45],[32,45],[32,46],[31,45]]]
             ]}},
            {"type": "Feature", "properties": {"NAME_1": "Kiev"},
             "geometry": {"type": "Polygon", "coordinates": [[[32,50],[33,50],[33,51],[32,50]]]}}
        ]
    }"#;

    #[test]
    fn parses_and_merges_by_name() {
        let coll = BoundaryCollection::from_geojson_str(TWO_REGIONS, "NAME_1").expect("parse");
        assert_eq!(coll.len(), 2);
        assert_eq!(coll.regions[0].name, "Kiev");
        assert_eq!(coll.get("Kiev").unwrap().polygons.len(), 2);
        assert_eq!(coll.get("Odessa").unwrap().polygons.len(), 2);
        assert_eq!(coll.get("Kiev").unwrap().points().count(), 8);
    }

    #[test]
    fn rejects_missing_name() {
        let err = BoundaryCollection::from_geojson_str(TWO_REGIONS, "NAME_2").unwrap_err();
        assert!(matches!(err, BoundaryError::InvalidFeature { index: 0, .. }));
    }

    #[test]
    fn rejects_non_area_geometry() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"NAME_1":"x"},
             "geometry":{"type":"Point","coordinates":[1,2]}}]}"#;
        let err = BoundaryCollection::from_geojson_str(payload, "NAME_1").unwrap_err();
        assert!(err.to_string().contains("unsupported region geometry type"));
    }

    #[test]
    fn rejects_other_documents() {
        let err = BoundaryCollection::from_geojson_str(r#"{"type":"Feature"}"#, "NAME_1");
        assert!(matches!(err, Err(BoundaryError::NotAFeatureCollection)));
        let err = BoundaryCollection::from_geojson_str("not json", "NAME_1");
        assert!(matches!(err, Err(BoundaryError::Json(_))));
    }
}
