//! Builds one data rods query per (model version, variable) pair.

use crate::config::pipeline_config::{LatLon, ModelVersion, PipelineConfig};
use crate::types::variable::Variable;
use chrono::NaiveDateTime;

const QUERY_TIME_FORMAT: &str = "%Y-%m-%dT%H";

/// A fully qualified request for one variable of one model version.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    pub version: String,
    pub variable: Variable,
    pub url: String,
}

impl QueryDescriptor {
    /// `{version}_{variable}.csv`, unique per pair so concurrent writes never collide.
    pub fn artifact_name(&self) -> String {
        artifact_name(&self.version, self.variable)
    }
}

pub fn artifact_name(version: &str, variable: Variable) -> String {
    format!("{}_{}.csv", version, variable.dataset_name())
}

/// Builds the query for a single pair.
pub fn build_query(
    base_url: &str,
    collection: &str,
    location: LatLon,
    version: &ModelVersion,
    variable: Variable,
) -> QueryDescriptor {
    let LatLon(lat, lon) = location;
    let url = format!(
        "{base}?variable={collection}:{tag}:{var}&startDate={start}&endDate={end}&location=GEOM:POINT({lon},%20{lat})&type=asc2",
        base = base_url,
        collection = collection,
        tag = version.tag,
        var = variable.dataset_name(),
        start = format_instant(version.start),
        end = format_instant(version.end),
        lon = lon,
        lat = lat,
    );
    QueryDescriptor {
        version: version.tag.clone(),
        variable,
        url,
    }
}

/// One query per configured (version, variable) pair, versions outermost.
pub fn build_queries(config: &PipelineConfig) -> Vec<QueryDescriptor> {
    config
        .versions
        .iter()
        .flat_map(|version| {
            config.variables.iter().map(move |&variable| {
                build_query(
                    &config.base_url,
                    &config.collection,
                    config.location,
                    version,
                    variable,
                )
            })
        })
        .collect()
}

fn format_instant(instant: NaiveDateTime) -> String {
    instant.format(QUERY_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::pipeline_config::offset_from_hours;

    fn config() -> PipelineConfig {
        PipelineConfig::builder()
            .location(LatLon(29.76, -95.37))
            .artifact_dir("artifacts")
            .output_path("summary.csv")
            .local_offset(offset_from_hours(6).unwrap())
            .build()
    }

    #[test]
    fn test_builds_one_query_per_pair() {
        let queries = build_queries(&config());
        assert_eq!(queries.len(), 8);

        let mut names: Vec<String> = queries.iter().map(|q| q.artifact_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 8, "artifact names must be unique");
    }

    #[test]
    fn test_query_url_shape() {
        let queries = build_queries(&config());
        let first = &queries[0];
        assert_eq!(first.version, "GLDAS_NOAH025_3H_v2.0");
        assert_eq!(first.variable, Variable::Wind);
        assert_eq!(
            first.url,
            "https://hydro1.gesdisc.eosdis.nasa.gov/daac-bin/access/timeseries.cgi\
             ?variable=GLDAS2:GLDAS_NOAH025_3H_v2.0:Wind_f_inst\
             &startDate=1980-01-01T00&endDate=2015-01-01T00\
             &location=GEOM:POINT(-95.37,%2029.76)&type=asc2"
        );
        assert_eq!(first.artifact_name(), "GLDAS_NOAH025_3H_v2.0_Wind_f_inst.csv");
    }
}
