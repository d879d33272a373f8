use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "storage": {
                "type": "object",
                "properties": {
                    "db_path": { "type": "string" },
                    "export_dir": { "type": "string" }
                }
            },
            "simulation": {
                "type": "object",
                "properties": {
                    "min_delay_ms": { "type": "integer", "minimum": 0 },
                    "max_delay_ms": { "type": "integer", "minimum": 0 },
                    "seed": { "type": "integer", "minimum": 0 }
                }
            },
            "tools": {
                "type": "object",
                "propertyNames": {
                    "enum": [
                        "email-checker", "phishing-detector", "call-tracer",
                        "voice-identifier", "document-scanner", "fake-news-tracker"
                    ]
                },
                "additionalProperties": { "$ref": "#/$defs/tool" }
            },
            "access": {
                "type": "object",
                "properties": {
                    "rules": { "type": "array", "items": { "$ref": "#/$defs/rule" } }
                }
            },
            "server": {
                "type": "object",
                "properties": {
                    "host": { "type": "string" },
                    "port": { "type": "integer", "minimum": 1, "maximum": 65535 }
                }
            },
            "auth": {
                "type": "object",
                "properties": {
                    "token_ttl_minutes": { "type": "integer", "minimum": 1 },
                    "bootstrap_admin": {
                        "type": "object",
                        "required": ["email", "password"],
                        "properties": {
                            "email": { "type": "string" },
                            "password": { "type": "string" },
                            "full_name": { "type": "string" },
                            "role": { "$ref": "#/$defs/role" }
                        }
                    }
                }
            }
        },
        "$defs": {
            "role": { "type": "string", "enum": ["admin", "investigator", "analyst", "viewer"] },
            "tool": {
                "type": "object",
                "properties": {
                    "history_cap": { "type": "integer", "minimum": 1, "maximum": 100 },
                    "min_delay_ms": { "type": "integer", "minimum": 0 },
                    "max_delay_ms": { "type": "integer", "minimum": 0 }
                }
            },
            "rule": {
                "type": "object",
                "required": ["prefix"],
                "properties": {
                    "prefix": { "type": "string", "pattern": "^/" },
                    "public": { "type": "boolean" },
                    "roles": { "type": "array", "items": { "$ref": "#/$defs/role" } }
                }
            }
        }
    })
});
