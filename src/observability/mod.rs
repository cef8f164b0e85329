pub mod pii;

use chrono::Utc;
use serde_json::{json, Value};
use self::pii::mask_pii;

/// JSON-lines logger. INFO and WARN go to stdout, ERROR to stderr.
#[derive(Debug, Clone)]
pub struct Logger {
    instance_id: String,
    component: Option<String>,
}

impl Logger {
    pub fn new(instance_id: String) -> Self {
        Self { instance_id, component: None }
    }

    /// A logger that tags every line with `component`.
    pub fn scoped(&self, component: &str) -> Self {
        Self {
            instance_id: self.instance_id.clone(),
            component: Some(component.to_string()),
        }
    }

    pub fn info(&self, msg: &str, context: Option<&Value>) {
        let entry = self.build_entry("INFO", msg, context);
        println!("{}", serde_json::to_string(&entry).unwrap_or_default());
    }

    pub fn warn(&self, msg: &str, context: Option<&Value>) {
        let entry = self.build_entry("WARN", msg, context);
        println!("{}", serde_json::to_string(&entry).unwrap_or_default());
    }

    pub fn error(&self, msg: &str, context: Option<&Value>) {
        let entry = self.build_entry("ERROR", msg, context);
        eprintln!("{}", serde_json::to_string(&entry).unwrap_or_default());
    }

    fn build_entry(&self, level: &str, msg: &str, context: Option<&Value>) -> Value {
        let now = Utc::now().to_rfc3339();
        let safe_msg = mask_pii(msg);

        let mut base = json!({
            "ts": now,
            "level": level,
            "msg": safe_msg,
            "instance_id": self.instance_id,
        });

        if let Some(base_obj) = base.as_object_mut() {
            if let Some(component) = &self.component {
                base_obj.insert("component".to_string(), json!(component));
            }
            if let Some(ctx_obj) = context.and_then(Value::as_object) {
                for (k, v) in ctx_obj {
                    // Mask string context values as well as the message
                    let safe_v = match v.as_str() {
                        Some(s) => json!(mask_pii(s)),
                        None => v.clone(),
                    };
                    base_obj.insert(k.clone(), safe_v);
                }
            }
        }

        base
    }
}
