//! Form payloads for the READY trajectory submission sequence.
//!
//! The archive trajectory flow is four chained CGI forms. The server keeps
//! the selections in session state, so they must be posted in order, each
//! with the previous form as referer.

use crate::types::TrajectoryParams;

/// Entry page of the archive trajectory flow
pub const ENTRY_REFERER_PATH: &str = "/hypub-bin/trajtype.pl?runtype=archive";
pub const RESULTS_PAGE_PATH: &str = "/hypub-bin/trajresults.pl";
pub const RESULTS_DIR_PATH: &str = "/hypubout";

/// One POST in the submission sequence
#[derive(Debug, Clone)]
pub struct FormStep {
    /// Short label used in logs and errors
    pub name: &'static str,
    pub path: &'static str,
    pub referer_path: &'static str,
    /// Form fields in the order the browser sends them
    pub fields: Vec<(&'static str, String)>,
}

/// Ordered form field list builder
#[derive(Debug, Default)]
struct FormBody {
    fields: Vec<(&'static str, String)>,
}

impl FormBody {
    fn field(mut self, key: &'static str, value: impl ToString) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }
}

/// Six-decimal coordinate, the precision the READY forms use
fn coord(value: f64) -> String {
    format!("{:.6}", value)
}

/// Build the four form steps for a trajectory run.
pub fn submission_steps(params: &TrajectoryParams) -> Vec<FormStep> {
    let source_type = FormBody::default()
        .field("nsrc", 1)
        .field("trjtype", 1);

    let location = FormBody::default()
        .field("metdata", &params.met_data)
        .field("SOURCELOC", "decdegree")
        .field("Lat", coord(params.latitude.abs()))
        .field("Latns", if params.latitude < 0.0 { "S" } else { "N" })
        .field("Lon", coord(params.longitude.abs()))
        .field("Lonew", if params.longitude < 0.0 { "W" } else { "E" })
        .field("Latd", "")
        .field("Latm", "")
        .field("Lats", "")
        .field("Latdns", "N")
        .field("Lond", "")
        .field("Lonm", "")
        .field("Lons", "")
        .field("Londew", "W")
        .field("CITYNAME", "")
        .field("WMO", "");

    let met_file = FormBody::default().field("mfile", &params.met_file);

    let [hgt1, hgt2, hgt3] = params.source_heights_m;
    let job = FormBody::default()
        .field("direction", params.direction)
        .field("vertical", params.vertical_motion)
        .field("Start year", params.start_year)
        .field("Start month", params.start_month)
        .field("Start day", params.start_day)
        .field("Start hour", params.start_hour)
        .field("duration", params.duration_hours)
        .field("repeatsrc", params.repeat_source)
        .field("ntrajs", params.trajectory_count)
        .field("Source lat", coord(params.latitude))
        .field("Source lon", coord(params.longitude))
        .field("Source lat2", "")
        .field("Source lon2", "")
        .field("Source lat3", "")
        .field("Source lon3", "")
        .field("Midlayer height", "No")
        .field("Source hgt1", hgt1)
        .field("Source hunit", 0)
        .field("Source hgt2", hgt2)
        .field("Source hgt3", hgt3)
        // Output options: GIS shapefiles plus a PDF plot
        .field("gis", 1)
        .field("gsize", 96)
        .field("Zoom Factor", 70)
        .field("projection", 0)
        .field("Vertical Unit", 1)
        .field("Label Interval", 6)
        .field("color", "Yes")
        .field("colortype", "Yes")
        .field("pltsrc", 1)
        .field("circle", -1)
        .field("county", "arlmap")
        .field("psfile", "No")
        .field("pdffile", "Yes")
        .field("mplot", "YES")
        .field("rain", 1);

    vec![
        FormStep {
            name: "source type",
            path: "/hypub-bin/trajasrc.pl",
            referer_path: ENTRY_REFERER_PATH,
            fields: source_type.fields,
        },
        FormStep {
            name: "source location",
            path: "/hypub-bin/trajsrcm.pl",
            referer_path: "/hypub-bin/trajasrc.pl",
            fields: location.fields,
        },
        FormStep {
            name: "meteorology file",
            path: "/hypub-bin/traj1.pl",
            referer_path: "/hypub-bin/trajsrcm.pl",
            fields: met_file.fields,
        },
        FormStep {
            name: "job parameters",
            path: "/hypub-bin/traj2.pl",
            referer_path: "/hypub-bin/traj1.pl",
            fields: job.fields,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn field<'a>(step: &'a FormStep, key: &str) -> Option<&'a str> {
        step.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_default_steps_match_recorded_session() {
        let steps = submission_steps(&TrajectoryParams::default());
        assert_eq!(steps.len(), 4);

        assert_eq!(
            steps[0].fields,
            vec![("nsrc", "1".to_string()), ("trjtype", "1".to_string())]
        );
        assert_eq!(steps[2].fields, vec![("mfile", "gdas1.oct22.w5".to_string())]);

        let keys: Vec<&str> = steps[1].fields.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                "metdata", "SOURCELOC", "Lat", "Latns", "Lon", "Lonew", "Latd", "Latm", "Lats",
                "Latdns", "Lond", "Lonm", "Lons", "Londew", "CITYNAME", "WMO",
            ]
        );
        assert_eq!(field(&steps[1], "metdata"), Some("GDAS1"));
        assert_eq!(field(&steps[1], "Lat"), Some("41.980000"));
        assert_eq!(field(&steps[1], "Latns"), Some("N"));
        assert_eq!(field(&steps[1], "Lon"), Some("87.900000"));
        assert_eq!(field(&steps[1], "Lonew"), Some("W"));

        let job = &steps[3];
        assert_eq!(job.fields.len(), 35);
        assert_eq!(job.fields[0], ("direction", "Backward".to_string()));
        assert_eq!(field(job, "Start year"), Some("22"));
        assert_eq!(field(job, "Start hour"), Some("22"));
        assert_eq!(field(job, "duration"), Some("168"));
        assert_eq!(field(job, "ntrajs"), Some("24"));
        assert_eq!(field(job, "Source lat"), Some("41.980000"));
        assert_eq!(field(job, "Source lon"), Some("-87.900000"));
        assert_eq!(field(job, "Source hgt1"), Some("500"));
        assert_eq!(field(job, "Zoom Factor"), Some("70"));
        assert_eq!(field(job, "circle"), Some("-1"));
        assert_eq!(job.fields.last(), Some(&("rain", "1".to_string())));
    }

    #[test]
    fn test_steps_chain_referers() {
        let steps = submission_steps(&TrajectoryParams::default());
        assert_eq!(steps[0].referer_path, ENTRY_REFERER_PATH);
        for pair in steps.windows(2) {
            assert_eq!(pair[1].referer_path, pair[0].path);
        }
        assert_eq!(steps[3].path, "/hypub-bin/traj2.pl");
    }

    #[test]
    fn test_southern_eastern_location() {
        let params = TrajectoryParams {
            latitude: -33.865,
            longitude: 151.209,
            direction: Direction::Forward,
            ..Default::default()
        };
        let steps = submission_steps(&params);
        assert_eq!(field(&steps[1], "Lat"), Some("33.865000"));
        assert_eq!(field(&steps[1], "Latns"), Some("S"));
        assert_eq!(field(&steps[1], "Lon"), Some("151.209000"));
        assert_eq!(field(&steps[1], "Lonew"), Some("E"));
        assert_eq!(field(&steps[3], "direction"), Some("Forward"));
        assert_eq!(field(&steps[3], "Source lat"), Some("-33.865000"));
        assert_eq!(field(&steps[3], "Source lon"), Some("151.209000"));
    }
}
