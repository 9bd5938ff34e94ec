use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Node of an Earth Engine expression graph
///
/// Mirrors the `ValueNode` of the REST API, restricted to the kinds this
/// crate builds. Function definitions are hoisted into the `values` table
/// when the expression is serialized.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(Value),
    Array(Vec<Node>),
    Dictionary(BTreeMap<String, Node>),
    Invocation {
        function: String,
        arguments: BTreeMap<String, Node>,
    },
    Function {
        arguments: Vec<String>,
        body: Box<Node>,
    },
    Argument(String),
}

impl Node {
    pub fn constant(value: impl Into<Value>) -> Self {
        Node::Constant(value.into())
    }

    pub fn strings<S: AsRef<str>>(values: &[S]) -> Self {
        Node::Constant(Value::Array(
            values.iter().map(|s| Value::from(s.as_ref())).collect(),
        ))
    }

    /// Invoke a named platform algorithm
    pub fn invoke<'a>(function: &str, arguments: impl IntoIterator<Item = (&'a str, Node)>) -> Self {
        Node::Invocation {
            function: function.to_string(),
            arguments: arguments
                .into_iter()
                .map(|(name, node)| (name.to_string(), node))
                .collect(),
        }
    }

    pub fn dictionary<'a>(entries: impl IntoIterator<Item = (&'a str, Node)>) -> Self {
        Node::Dictionary(
            entries
                .into_iter()
                .map(|(key, node)| (key.to_string(), node))
                .collect(),
        )
    }

    /// Single-argument function, as used by `Collection.map`
    pub fn function(argument: &str, body: Node) -> Self {
        Node::Function {
            arguments: vec![argument.to_string()],
            body: Box::new(body),
        }
    }

    pub fn argument(name: &str) -> Self {
        Node::Argument(name.to_string())
    }
}

/// Complete expression sent to `value:compute`
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    root: Node,
}

impl Expression {
    pub fn new(root: Node) -> Self {
        Expression { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Encode as `{"result": id, "values": {id: ValueNode}}`
    ///
    /// Identical invocations are stored once and shared through
    /// `valueReference`; entries referenced a single time are inlined again.
    pub fn to_json(&self) -> Value {
        let mut table = ValueTable::default();
        let result = table.reference(&self.root);
        json!({ "result": result, "values": table.finish(&result) })
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[derive(Default)]
struct ValueTable {
    values: Map<String, Value>,
    /// Encoded value (as JSON text) -> id
    ids: HashMap<String, String>,
    /// Ids named by a function body; never inlined
    bodies: HashSet<String>,
}

impl ValueTable {
    /// Id of the encoded node, reusing an existing entry with the same content
    fn reference(&mut self, node: &Node) -> String {
        let encoded = match node {
            Node::Invocation {
                function,
                arguments,
            } => {
                let arguments: Map<String, Value> = arguments
                    .iter()
                    .map(|(name, item)| (name.clone(), self.encode(item)))
                    .collect();
                json!({
                    "functionInvocationValue": {
                        "functionName": function,
                        "arguments": arguments,
                    }
                })
            }
            other => self.encode(other),
        };
        self.intern(encoded)
    }

    fn intern(&mut self, encoded: Value) -> String {
        let key = encoded.to_string();
        if let Some(id) = self.ids.get(&key) {
            return id.clone();
        }
        let id = self.values.len().to_string();
        self.values.insert(id.clone(), encoded);
        self.ids.insert(key, id.clone());
        id
    }

    /// Inline form of a node; invocations become references into the table
    fn encode(&mut self, node: &Node) -> Value {
        match node {
            Node::Constant(value) => json!({ "constantValue": value }),
            Node::Array(items) => {
                let values: Vec<Value> = items.iter().map(|item| self.encode(item)).collect();
                json!({ "arrayValue": { "values": values } })
            }
            Node::Dictionary(entries) => {
                let values: Map<String, Value> = entries
                    .iter()
                    .map(|(key, item)| (key.clone(), self.encode(item)))
                    .collect();
                json!({ "dictionaryValue": { "values": values } })
            }
            Node::Invocation { .. } => json!({ "valueReference": self.reference(node) }),
            Node::Function { arguments, body } => {
                let body_id = self.reference(body);
                self.bodies.insert(body_id.clone());
                json!({
                    "functionDefinitionValue": {
                        "argumentNames": arguments,
                        "body": body_id,
                    }
                })
            }
            Node::Argument(name) => json!({ "argumentReference": name }),
        }
    }

    /// Inline every entry referenced exactly once, except the result and function bodies
    fn finish(self, result: &str) -> Map<String, Value> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for value in self.values.values() {
            count_references(value, &mut counts);
        }

        let mut pinned = self.bodies;
        pinned.insert(result.to_string());
        let inlined: HashSet<String> = counts
            .into_iter()
            .filter(|(id, count)| *count == 1 && !pinned.contains(id))
            .map(|(id, _)| id)
            .collect();

        self.values
            .iter()
            .filter(|(id, _)| !inlined.contains(*id))
            .map(|(id, value)| (id.clone(), inline(value, &self.values, &inlined)))
            .collect()
    }
}

fn as_reference(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) if map.len() == 1 => map.get("valueReference")?.as_str(),
        _ => None,
    }
}

fn count_references(value: &Value, counts: &mut HashMap<String, usize>) {
    if let Some(id) = as_reference(value) {
        *counts.entry(id.to_string()).or_default() += 1;
        return;
    }
    match value {
        Value::Object(map) => map.values().for_each(|v| count_references(v, counts)),
        Value::Array(items) => items.iter().for_each(|v| count_references(v, counts)),
        _ => {}
    }
}

fn inline(value: &Value, table: &Map<String, Value>, inlined: &HashSet<String>) -> Value {
    if let Some(id) = as_reference(value) {
        return match table.get(id) {
            Some(target) if inlined.contains(id) => inline(target, table, inlined),
            _ => value.clone(),
        };
    }
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| (key.clone(), inline(v, table, inlined)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| inline(v, table, inlined)).collect()),
        other => other.clone(),
    }
}
