//! Data context lookups, truthiness and value stringification.
//!
//! A data context is the stored answer object of a resume: dot-qualified
//! field names mapped to JSON values. List fields hold arrays of objects keyed
//! by the same qualified names (`Education.Form.List` → `[{"Education.Form.List.School": ..}]`).

use serde_json::{Map, Value};

use crate::template::directive::parent_key;

pub type DataContext = Map<String, Value>;

/// One level of list iteration.
#[derive(Debug, Clone, Copy)]
pub enum ListScope<'d> {
    /// An element of a list being iterated by `ForEachIn`.
    Element { list_key: &'d str, element: &'d Value },
    /// An index applied to whatever list a field's parent key names, read
    /// from top-level data.
    Index(usize),
}

/// Resolves field values against top-level data and the active list scopes.
pub struct Lookup<'d> {
    data: &'d DataContext,
    scopes: Vec<ListScope<'d>>,
}

impl<'d> Lookup<'d> {
    pub fn new(data: &'d DataContext, list_index: Option<usize>) -> Self {
        Self {
            data,
            scopes: list_index.map(ListScope::Index).into_iter().collect(),
        }
    }

    pub fn push(&mut self, scope: ListScope<'d>) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    /// The innermost scope that owns `key` decides; otherwise top-level data.
    pub fn get(&self, key: &str) -> Option<&'d Value> {
        let parent = parent_key(key);
        for scope in self.scopes.iter().rev() {
            match *scope {
                ListScope::Element { list_key, element } if parent == Some(list_key) => {
                    return element.get(key);
                }
                ListScope::Index(index) => {
                    let list = parent
                        .and_then(|list_key| self.data.get(list_key))
                        .and_then(Value::as_array);
                    if let Some(list) = list {
                        return list.get(index).and_then(|element| element.get(key));
                    }
                }
                ListScope::Element { .. } => {}
            }
        }
        self.data.get(key)
    }

    /// True when any top-level key mentions the form key.
    pub fn form_present(&self, form_key: &str) -> bool {
        self.data.keys().any(|k| k.contains(form_key))
    }
}

/// Falsy: absent, null, `false`, zero, NaN, empty string. Everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Renders a value for direct insertion into the document.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(value: Value) -> DataContext {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(null))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(0.0))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(is_truthy(Some(&json!("0"))));
        assert!(is_truthy(Some(&json!(3))));
        assert!(is_truthy(Some(&json!([]))));
        assert!(is_truthy(Some(&json!({}))));
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&json!("hi")), "hi");
        assert_eq!(stringify(&json!(4)), "4");
        assert_eq!(stringify(&json!(4.0)), "4");
        assert_eq!(stringify(&json!(2.5)), "2.5");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!(["a", "b"])), "a,b");
    }

    #[test]
    fn test_top_level_lookup() {
        let data = ctx(json!({"A.B.C": "x"}));
        let lookup = Lookup::new(&data, None);
        assert_eq!(lookup.get("A.B.C"), Some(&json!("x")));
        assert_eq!(lookup.get("A.B.D"), None);
    }

    #[test]
    fn test_element_scope_shadows_top_level() {
        let data = ctx(json!({
            "E.F.List.School": "top",
            "E.F.List": [{"E.F.List.School": "first"}, {"E.F.List.School": "second"}]
        }));
        let list = data.get("E.F.List").unwrap();
        let mut lookup = Lookup::new(&data, None);
        lookup.push(ListScope::Element {
            list_key: "E.F.List",
            element: &list[1],
        });
        assert_eq!(lookup.get("E.F.List.School"), Some(&json!("second")));
        lookup.pop();
        assert_eq!(lookup.get("E.F.List.School"), Some(&json!("top")));
    }

    #[test]
    fn test_element_scope_missing_key_is_absent() {
        let data = ctx(json!({
            "E.F.List.Degree": "top",
            "E.F.List": [{"E.F.List.School": "first"}]
        }));
        let list = data.get("E.F.List").unwrap();
        let mut lookup = Lookup::new(&data, None);
        lookup.push(ListScope::Element {
            list_key: "E.F.List",
            element: &list[0],
        });
        assert_eq!(lookup.get("E.F.List.Degree"), None);
    }

    #[test]
    fn test_unrelated_keys_fall_back_to_top_level() {
        let data = ctx(json!({
            "P.F.Name": "Ada",
            "E.F.List": [{"E.F.List.School": "first"}]
        }));
        let list = data.get("E.F.List").unwrap();
        let mut lookup = Lookup::new(&data, None);
        lookup.push(ListScope::Element {
            list_key: "E.F.List",
            element: &list[0],
        });
        assert_eq!(lookup.get("P.F.Name"), Some(&json!("Ada")));
    }

    #[test]
    fn test_index_scope_reads_from_parent_list() {
        let data = ctx(json!({
            "E.F.List": [{"E.F.List.School": "first"}, {"E.F.List.School": "second"}]
        }));
        let lookup = Lookup::new(&data, Some(1));
        assert_eq!(lookup.get("E.F.List.School"), Some(&json!("second")));
        assert_eq!(Lookup::new(&data, Some(7)).get("E.F.List.School"), None);
    }

    #[test]
    fn test_index_scope_ignores_non_list_parents() {
        let data = ctx(json!({"P.F.Name": "Ada", "E.F.List": []}));
        assert_eq!(
            Lookup::new(&data, Some(0)).get("P.F.Name"),
            Some(&json!("Ada"))
        );
    }

    #[test]
    fn test_form_present_is_substring_match() {
        let data = ctx(json!({"Skills.Form.Languages": "Rust"}));
        let lookup = Lookup::new(&data, None);
        assert!(lookup.form_present("Skills.Form"));
        assert!(!lookup.form_present("Awards.Form"));
    }
}
