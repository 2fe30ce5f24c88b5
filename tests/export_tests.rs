//! Export module tests

use std::fs;

use survey_export_sdk::columns::ColumnSchemaBuilder;
use survey_export_sdk::config::{ExportConfig, IncludeMeta};
use survey_export_sdk::export::{
    ExportError, ExportFormat, ExportJob, ResponseExporter, ResponseParser, SurveyInfoExporter,
};
use survey_export_sdk::handlers::{ColumnValues, HandlerRegistry, QuestionTypeHandler};
use survey_export_sdk::models::{
    OptionType, ResponseDef, ResponseItem, ResponseMeta, ResponseOption, SurveyItemResponse,
    SurveyQuestion, SurveyResponse, SurveyVersionPreview,
};

fn choice_question(options: Vec<ResponseOption>) -> SurveyQuestion {
    SurveyQuestion::new("weekly.Q1", "single_choice")
        .with_title("Main symptom")
        .with_responses(vec![ResponseDef::new("scg", "singleChoiceGroup").with_options(options)])
}

/// v1 [100, 200) offers a/b, v2 [200, ∞) adds a free text "other" option
fn two_versions() -> Vec<SurveyVersionPreview> {
    vec![
        SurveyVersionPreview::new("v1", 100, 200).with_questions(vec![choice_question(vec![
            ResponseOption::new("a", OptionType::Radio),
            ResponseOption::new("b", OptionType::Radio),
        ])]),
        SurveyVersionPreview::new("v2", 200, 0).with_questions(vec![
            choice_question(vec![
                ResponseOption::new("a", OptionType::Radio),
                ResponseOption::new("b", OptionType::Radio),
                ResponseOption::new("other", OptionType::TextInput),
            ]),
            SurveyQuestion::new("weekly.age", "numeric_input")
                .with_responses(vec![ResponseDef::new("num", "numberInput")]),
        ]),
    ]
}

fn choice_answer(selected: ResponseItem) -> SurveyItemResponse {
    SurveyItemResponse::new(
        "weekly.Q1",
        ResponseItem::group("rg", vec![ResponseItem::group("scg", vec![selected])]),
    )
}

fn responses() -> Vec<SurveyResponse> {
    vec![
        SurveyResponse::new("r1", "", 150)
            .with_participant("p1")
            .with_responses(vec![choice_answer(ResponseItem::new("a"))]),
        SurveyResponse::new("r2", "", 250)
            .with_participant("p2")
            .with_responses(vec![
                choice_answer(ResponseItem::with_value("other", "headache")),
                SurveyItemResponse::new(
                    "weekly.age",
                    ResponseItem::group("rg", vec![ResponseItem::with_value("num", "42")]),
                ),
            ]),
    ]
}

mod response_export_tests {
    use super::*;

    #[test]
    fn test_shared_header_across_versions() {
        let versions = two_versions();
        let registry = HandlerRegistry::with_defaults();
        let config = ExportConfig::default();

        let job = ExportJob::new(&versions, &registry, &config).unwrap();
        let (summary, out) = job.run(Vec::new(), responses(), |_| {}).unwrap();
        assert_eq!(summary.written, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.fallback_resolutions, 0);

        let csv = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            [
                "ID,participantID,version,opened,submitted,weekly.Q1,weekly.Q1-other,weekly.age",
                "r1,p1,v1,,150,a,,",
                "r2,p2,v2,,250,other,headache,42",
            ]
        );
    }

    #[test]
    fn test_json_export_omits_missing_keys() {
        let versions = two_versions();
        let registry = HandlerRegistry::with_defaults();
        let config = ExportConfig::builder().format("json").build().unwrap();

        let job = ExportJob::new(&versions, &registry, &config).unwrap();
        let (_, out) = job.run(Vec::new(), responses(), |_| {}).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let rows = json["responses"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["weekly.Q1"], "a");
        assert!(rows[0].get("weekly.Q1-other").is_none());
        assert!(rows[0].get("opened").unwrap().is_null());
        assert_eq!(rows[1]["weekly.Q1-other"], "headache");
        assert_eq!(rows[1]["submitted"], 250);
    }

    #[test]
    fn test_meta_columns() {
        let versions = two_versions();
        let registry = HandlerRegistry::with_defaults();
        let config = ExportConfig::builder()
            .question_option_separator("|")
            .include_meta(IncludeMeta {
                displayed_times: true,
                position: true,
                ..IncludeMeta::default()
            })
            .build()
            .unwrap();

        let response = SurveyResponse::new("r1", "v1", 150).with_responses(vec![
            choice_answer(ResponseItem::new("b")).with_meta(ResponseMeta {
                position: 0,
                displayed: vec![120, 130],
                ..ResponseMeta::default()
            }),
        ]);

        let job = ExportJob::new(&versions, &registry, &config).unwrap();
        let (_, out) = job.run(Vec::new(), vec![response], |_| {}).unwrap();
        let csv = String::from_utf8(out).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ID,participantID,version,opened,submitted,weekly.Q1,weekly.Q1|metaDisplayed,\
             weekly.Q1|metaPosition,weekly.Q1|other,weekly.age,weekly.age|metaDisplayed,\
             weekly.age|metaPosition"
        );
        assert_eq!(lines.next().unwrap(), "r1,,v1,,150,b,120;130,0,,,,");
    }

    #[test]
    fn test_missing_meta_exports_unknown_position() {
        let versions = two_versions();
        let registry = HandlerRegistry::with_defaults();
        let config = ExportConfig::builder()
            .include_meta(IncludeMeta {
                position: true,
                ..IncludeMeta::default()
            })
            .build()
            .unwrap();

        let response: SurveyResponse = serde_json::from_str(
            r#"{
                "id": "r1",
                "versionID": "v1",
                "submittedAt": 150,
                "responses": [
                    {"key": "weekly.Q1", "response": {"key": "rg", "items": [
                        {"key": "scg", "items": [{"key": "a"}]}
                    ]}}
                ]
            }"#,
        )
        .unwrap();

        let job = ExportJob::new(&versions, &registry, &config).unwrap();
        let (_, out) = job.run(Vec::new(), vec![response], |_| {}).unwrap();
        let csv = String::from_utf8(out).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ID,participantID,version,opened,submitted,weekly.Q1,weekly.Q1-metaPosition,\
             weekly.Q1-other,weekly.age,weekly.age-metaPosition"
        );
        assert_eq!(lines.next().unwrap(), "r1,,v1,,150,a,-1,,,");
    }

    #[test]
    fn test_unresolvable_responses_are_skipped() {
        let versions = vec![SurveyVersionPreview::new("draft", 0, 0)];
        let registry = HandlerRegistry::with_defaults();
        let config = ExportConfig::default();

        let mut last = None;
        let job = ExportJob::new(&versions, &registry, &config).unwrap();
        let (summary, out) = job
            .run(Vec::new(), responses(), |progress| last = Some(*progress))
            .unwrap();

        assert_eq!(summary.written, 0);
        assert_eq!(summary.skipped, 2);
        let last = last.unwrap();
        assert_eq!((last.processed, last.written, last.skipped), (2, 0, 2));
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_export_to_file() {
        let versions = two_versions();
        let registry = HandlerRegistry::with_defaults();
        let config = ExportConfig::default();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.csv");
        let file = fs::File::create(&path).unwrap();

        let job = ExportJob::new(&versions, &registry, &config).unwrap();
        job.run(file, responses(), |_| {}).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("r2,p2,v2,,250,other,headache,42"));
    }

    #[test]
    fn test_manual_exporter_lifecycle() {
        let versions = two_versions();
        let registry = HandlerRegistry::with_defaults();
        let columns = ColumnSchemaBuilder::new(&registry, "-").build(&versions);
        let parser = ResponseParser::new(&versions, &registry, "-");

        let mut exporter = ResponseExporter::new(ExportFormat::Json, columns, Vec::new());
        exporter.init().unwrap();
        for response in responses() {
            let parsed = parser.parse(&response).unwrap();
            exporter.write_response(&parsed).unwrap();
        }
        exporter.finish().unwrap();
        exporter.finish().unwrap();
        assert!(matches!(
            exporter.write_values(&ColumnValues::new()),
            Err(ExportError::InvalidState(_))
        ));

        let out = String::from_utf8(exporter.into_inner().unwrap()).unwrap();
        assert!(out.starts_with(r#"{"responses":[{"ID":"r1""#));
        assert_eq!(out.matches("]}").count(), 1);
    }
}

mod handler_extension_tests {
    use super::*;

    /// Exports a consent checkbox as 1/0
    struct ConsentHandler;

    impl QuestionTypeHandler for ConsentHandler {
        fn response_column_names(
            &self,
            question: &SurveyQuestion,
            _separator: &str,
        ) -> Vec<String> {
            vec![question.id.clone()]
        }

        fn parse_response(
            &self,
            question: &SurveyQuestion,
            response: Option<&SurveyItemResponse>,
            _separator: &str,
        ) -> ColumnValues {
            let given = response.and_then(|r| r.response.as_ref()).is_some();
            let mut values = ColumnValues::new();
            values.insert(question.id.clone(), serde_json::json!(u8::from(given)));
            values
        }
    }

    #[test]
    fn test_custom_handler_and_unknown_type() {
        let versions = vec![SurveyVersionPreview::new("v1", 100, 0).with_questions(vec![
            SurveyQuestion::new("s.consent", "consent"),
            SurveyQuestion::new("s.matrix", "matrix_choice"),
        ])];
        let registry = HandlerRegistry::with_defaults().register("consent", ConsentHandler);
        assert!(registry.contains("consent"));
        assert!(!registry.contains("matrix_choice"));

        let config = ExportConfig::default();
        let response = SurveyResponse::new("r1", "v1", 110).with_responses(vec![
            SurveyItemResponse::new("s.consent", ResponseItem::new("rg")),
            SurveyItemResponse::new("s.matrix", ResponseItem::new("rg")),
        ]);

        let job = ExportJob::new(&versions, &registry, &config).unwrap();
        let (summary, out) = job.run(Vec::new(), vec![response], |_| {}).unwrap();
        assert_eq!(summary.columns, 6);

        let csv = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "ID,participantID,version,opened,submitted,s.consent");
        assert_eq!(lines[1], "r1,,v1,,110,1");
    }
}

mod survey_info_tests {
    use super::*;

    #[test]
    fn test_codebook_covers_all_versions() {
        let rows = SurveyInfoExporter::new()
            .with_short_keys("weekly")
            .rows(&two_versions());

        // v1: a, b; v2: a, b, other, age slot
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].version_id, "v1");
        assert_eq!(rows[0].question_key, "Q1");
        assert_eq!(rows[4].option_type, "input");
        assert_eq!(rows[5].question_key, "age");
        assert_eq!(rows[5].response_key, "num");
        assert_eq!(rows[5].option_key, "");
        assert_eq!(rows[2].unpublished, "");
        assert_eq!(rows[0].unpublished, "1970-01-01T00:03:20Z");
    }

    #[test]
    fn test_codebook_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codebook.json");
        let file = fs::File::create(&path).unwrap();

        let config = ExportConfig::from_toml_str(
            r#"
            shortKeys = true
            surveyKey = "weekly"
            format = "json"
            "#,
        )
        .unwrap();
        let format: ExportFormat = config.format.parse().unwrap();
        SurveyInfoExporter::from_config(&config)
            .export(&two_versions(), format, file)
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let versions = json["versions"].as_array().unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[1]["questions"][1]["key"], "age");
        assert_eq!(
            versions[1]["questions"][0]["responses"][0]["options"][2]["optionType"],
            "input"
        );
    }
}
