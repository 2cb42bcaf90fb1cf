//! Example tools served by the demo host.

use anyhow::{Context, Result, anyhow, ensure};
use reqwest::Url;
use serde_json::{Map, Value};
use toolbox::registry::RegistrationResult;
use toolbox::{Registrar, tool};

const WEATHER_ENDPOINT: &str = "https://wttr.in/";

const CURRENT_CONDITION_KEYS: &[&str] = &[
    "temp_C",
    "FeelsLikeC",
    "humidity",
    "weatherDesc",
    "observation_time",
];

const HANDBOOK: &[(&str, &str)] = &[
    (
        "FIOS",
        "Factory Intelligent Operation System，工厂智能运营管理：是一种采用人工智能和物联网技术的工厂数字化管理系统。它可以实现生产过程的全面监控、数据分析和预测，实现生产资源的精细化管理和智能化运营监控，帮助企业优化生产流程、提高生产效率和降低成本。包括：生产计划、仓储物流、质量控制、机器维护、供应链管理、和成本分析等管理功能。",
    ),
    (
        "APS",
        "Advanced Planning System，高级计划排程系统：提供爬坡、试产和量产等不同阶段的物料计划与生产计划的排布与调整、以及监控与反馈生产达成情况的功能。",
    ),
    (
        "PMS",
        "Process management system，工艺管理系统：提供工艺SOP设计与制作、审批与转发、工艺项目管理、工艺差异分析、工艺问题诊断与解决方案推荐的一系列工艺数字化功能",
    ),
    (
        "MES",
        "Manufacturing execution system，制造执行系统：对产线生产过程进行管理和卡控\t包括：过站配置与管理、与自动化对接、产线物流调度、数据采集与分析等",
    ),
    (
        "WMS",
        "Warehouse management system，仓储物流管理系统：提供物料、半成品和成品的仓储物流全部环节的管理，包括：出库、入库、库内管理、备品备件管理、与AGV或智能货架等智能设备对接、物流调度等",
    ),
    (
        "QMS",
        "Quality Management System，质量管理系统：依据质量管理体系对工厂从来料到成品出厂进行全流程的质量管理，包括：lQC、IPQC、FQC、0QC、质量分析、质量溯源等",
    ),
    (
        "TPM",
        "Total Productive Maintenance，设备管理系统：提供工厂内生产设备全生命周期的维保管理和资产管理工具，包括：维保计划、维保实施、备件管理、资产管理等",
    ),
    (
        "MOM",
        "Manufacturing Operation Management，制造运营管理：制造运营管理系统平台",
    ),
    (
        "于成铭",
        "软件工程部下属工业智能组的一名成员，负责数字员工项目",
    ),
];

/// Registers every demo tool.
///
/// # Errors
///
/// Propagates the first registration failure.
pub fn register_all(registrar: &Registrar<'_>) -> RegistrationResult<()> {
    registrar.register(random_number_generator_tool())?;
    registrar.register(get_weather_tool())?;
    registrar.register(im_handbook_tool())?;
    Ok(())
}

/// Generates a random number x, s.t. range.0 <= x <= range.1
#[tool(crate = "toolbox::registry")]
fn random_number_generator(
    #[param("The random seed used by the generator", true)] seed: i64,
    #[param("The range of the generated numbers", true)] range: (i64, i64),
) -> Result<i64> {
    let (low, high) = range;
    ensure!(low <= high, "range ({low}, {high}) is empty");

    let draw = splitmix64(u64::from_ne_bytes(seed.to_ne_bytes()));
    // `checked_add` only fails for the full i64 domain, where any draw fits.
    let offset = match high.abs_diff(low).checked_add(1) {
        Some(span) => draw % span,
        None => draw,
    };
    Ok(low.wrapping_add_unsigned(offset))
}

fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Get the current weather for `city_name`
#[tool(crate = "toolbox::registry")]
fn get_weather(#[param("The name of the city to be queried", true)] city_name: String) -> String {
    match fetch_weather(&city_name) {
        Ok(report) => Value::Object(report).to_string(),
        Err(err) => format!("Error encountered while fetching weather data!\n{err:?}"),
    }
}

fn fetch_weather(city_name: &str) -> Result<Map<String, Value>> {
    let mut url = Url::parse(WEATHER_ENDPOINT)?;
    url.path_segments_mut()
        .map_err(|()| anyhow!("weather endpoint cannot carry a path"))?
        .clear()
        .push(city_name);
    url.query_pairs_mut().append_pair("format", "j1");

    let body: Value = reqwest::blocking::get(url)
        .and_then(reqwest::blocking::Response::error_for_status)
        .context("weather request failed")?
        .json()
        .context("weather response is not JSON")?;

    select_current(&body)
}

/// Keeps the reported `current_condition` keys of a wttr.in `j1` body.
fn select_current(body: &Value) -> Result<Map<String, Value>> {
    let current = body
        .pointer("/current_condition/0")
        .context("weather response has no current condition")?;

    let mut selected = Map::new();
    for key in CURRENT_CONDITION_KEYS {
        let value = current
            .get(*key)
            .with_context(|| format!("weather response is missing `{key}`"))?;
        selected.insert((*key).to_owned(), value.clone());
    }

    let mut report = Map::new();
    report.insert("current_condition".into(), Value::Object(selected));
    Ok(report)
}

/// Get the explanation for `key_word_name`
#[tool(name = "IM_Handbook", crate = "toolbox::registry")]
fn im_handbook(
    #[param("The name of the Knowledge", true)] key_word_name: String,
) -> Result<&'static str> {
    HANDBOOK
        .iter()
        .find(|(key, _)| *key == key_word_name)
        .map(|(_, entry)| *entry)
        .ok_or_else(|| anyhow!("Key word name `{key_word_name}` is not contained"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use toolbox::{ToolArgs, ToolRegistry};

    fn registry() -> ToolRegistry {
        let registry = ToolRegistry::new();
        register_all(&Registrar::new(&registry)).unwrap();
        registry
    }

    #[test]
    fn registers_every_tool() {
        let tools = registry().list_tools();
        let names: Vec<_> = tools.keys().map(String::as_str).collect();
        assert_eq!(names, ["IM_Handbook", "get_weather", "random_number_generator"]);

        let rng = &tools["random_number_generator"];
        assert_eq!(rng.params()[1].ty(), "(i64, i64)");
        assert_eq!(
            rng.description(),
            "Generates a random number x, s.t. range.0 <= x <= range.1"
        );
    }

    #[test]
    fn random_numbers_are_seeded_and_in_range() {
        let registry = registry();
        let args = ToolArgs::new().with("seed", 42).with("range", json!([10, 20]));

        let first = registry.dispatch("random_number_generator", &args);
        let second = registry.dispatch("random_number_generator", &args);
        assert_eq!(first, second);

        let value: i64 = first.parse().unwrap();
        assert!((10..=20).contains(&value));
    }

    #[test]
    fn negative_seeds_and_single_point_ranges_are_accepted() {
        let out = registry().dispatch(
            "random_number_generator",
            &ToolArgs::new().with("seed", -7).with("range", json!([3, 3])),
        );
        assert_eq!(out, "3");

        for seed in -16..16 {
            let value = random_number_generator(seed, (-2, 2)).unwrap();
            assert!((-2..=2).contains(&value));
        }
    }

    #[test]
    fn extreme_ranges_do_not_overflow() {
        for seed in 0..32 {
            let value = random_number_generator(seed, (i64::MIN, i64::MAX)).unwrap();
            assert!((i64::MIN..=i64::MAX).contains(&value));
        }
    }

    #[test]
    fn empty_range_is_reported() {
        let out = registry().dispatch(
            "random_number_generator",
            &ToolArgs::new().with("seed", 1).with("range", json!([4, 3])),
        );
        assert!(out.contains("range (4, 3) is empty"));
    }

    #[test]
    fn non_integer_range_is_reported() {
        let out = registry().dispatch(
            "random_number_generator",
            &ToolArgs::new().with("seed", 1).with("range", json!(["a", "b"])),
        );
        assert!(out.contains("invalid value for argument `range`"));
    }

    fn weather_fixture() -> Value {
        json!({
            "current_condition": [{
                "temp_C": "21",
                "FeelsLikeC": "20",
                "humidity": "40",
                "weatherDesc": [{"value": "Sunny"}],
                "observation_time": "06:00 AM",
                "windspeedKmph": "9",
            }],
            "nearest_area": [],
        })
    }

    #[test]
    fn select_current_keeps_reported_keys() {
        let report = select_current(&weather_fixture()).unwrap();
        let current = &report["current_condition"];

        assert_eq!(current["temp_C"], "21");
        assert_eq!(current["weatherDesc"], json!([{"value": "Sunny"}]));
        assert_eq!(current.as_object().map(Map::len), Some(CURRENT_CONDITION_KEYS.len()));
        assert!(current.get("windspeedKmph").is_none());
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn select_current_reports_missing_data() {
        let err = select_current(&json!({"current_condition": []}))
            .expect_err("no observation should fail");
        assert!(err.to_string().contains("no current condition"));

        let mut body = weather_fixture();
        body["current_condition"][0]
            .as_object_mut()
            .unwrap()
            .remove("humidity");
        let err = select_current(&body).expect_err("missing key should fail");
        assert!(err.to_string().contains("missing `humidity`"));
    }

    #[test]
    fn handbook_lookups() {
        let registry = registry();
        let hit = registry.dispatch("IM_Handbook", &ToolArgs::new().with("key_word_name", "MES"));
        assert!(hit.starts_with("Manufacturing execution system，制造执行系统"));

        let person = registry.dispatch("IM_Handbook", &ToolArgs::new().with("key_word_name", "于成铭"));
        assert!(person.contains("数字员工项目"));

        let miss = registry.dispatch("IM_Handbook", &ToolArgs::new().with("key_word_name", "XYZ"));
        assert!(miss.contains("Key word name `XYZ` is not contained"));
    }
}
