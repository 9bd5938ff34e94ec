//! Constructors for the Earth Engine algorithms used by the dataset strategies.
//! Each function returns an unevaluated [`Node`]; nothing runs until the
//! enclosing expression is sent to `value:compute`.
use geojson::PolygonType;
use serde_json::Value;

use super::expression::Node;
use crate::collect::global_variables::TIME_START;

pub fn image_collection(id: &str) -> Node {
    Node::invoke("ImageCollection.load", [("id", Node::constant(id))])
}

pub fn polygon(rings: &PolygonType) -> Node {
    let coordinates: Value = rings
        .iter()
        .map(|ring| {
            ring.iter()
                .map(|position| Value::from(position.clone()))
                .collect::<Value>()
        })
        .collect();
    Node::invoke(
        "GeometryConstructors.Polygon",
        [
            ("coordinates", Node::Constant(coordinates)),
            ("evenOdd", Node::constant(true)),
        ],
    )
}

fn filter(collection: Node, predicate: Node) -> Node {
    Node::invoke(
        "Collection.filter",
        [("collection", collection), ("filter", predicate)],
    )
}

/// `collection.filterDate(start, end)`
pub fn filter_date(collection: Node, start: impl Into<Value>, end: impl Into<Value>) -> Node {
    let date = |value: Value| Node::invoke("Date", [("value", Node::Constant(value))]);
    let range = Node::invoke(
        "DateRange",
        [("start", date(start.into())), ("end", date(end.into()))],
    );
    filter(
        collection,
        Node::invoke(
            "Filter.dateRangeContains",
            [("leftValue", range), ("rightField", Node::constant(TIME_START))],
        ),
    )
}

/// `collection.filterBounds(geometry)`
pub fn filter_bounds(collection: Node, geometry: Node) -> Node {
    filter(
        collection,
        Node::invoke(
            "Filter.intersects",
            [("leftField", Node::constant(".all")), ("rightValue", geometry)],
        ),
    )
}

/// `collection.filter(ee.Filter.lt(property, value))`
pub fn filter_less_than(collection: Node, property: &str, value: f64) -> Node {
    filter(
        collection,
        Node::invoke(
            "Filter.lessThan",
            [
                ("leftField", Node::constant(property)),
                ("rightValue", Node::constant(value)),
            ],
        ),
    )
}

/// `collection.map(lambda var: body)`
pub fn map(collection: Node, var: &str, body: Node) -> Node {
    Node::invoke(
        "Collection.map",
        [
            ("collection", collection),
            ("baseAlgorithm", Node::function(var, body)),
        ],
    )
}

pub fn select(image: Node, bands: &[&str]) -> Node {
    Node::invoke(
        "Image.select",
        [("input", image), ("bandSelectors", Node::strings(bands))],
    )
}

pub fn rename(image: Node, name: &str) -> Node {
    Node::invoke(
        "Image.rename",
        [("input", image), ("names", Node::strings(&[name]))],
    )
}

pub fn add_bands(dst: Node, src: Node) -> Node {
    Node::invoke("Image.addBands", [("dstImg", dst), ("srcImg", src)])
}

pub fn normalized_difference(image: Node, first: &str, second: &str) -> Node {
    Node::invoke(
        "Image.normalizedDifference",
        [("input", image), ("bandNames", Node::strings(&[first, second]))],
    )
}

pub fn constant_image(value: f64) -> Node {
    Node::invoke("Image.constant", [("value", Node::constant(value))])
}

fn binary(function: &str, image1: Node, image2: Node) -> Node {
    Node::invoke(function, [("image1", image1), ("image2", image2)])
}

pub fn add(a: Node, b: Node) -> Node {
    binary("Image.add", a, b)
}

pub fn subtract(a: Node, b: Node) -> Node {
    binary("Image.subtract", a, b)
}

pub fn multiply(a: Node, b: Node) -> Node {
    binary("Image.multiply", a, b)
}

pub fn divide(a: Node, b: Node) -> Node {
    binary("Image.divide", a, b)
}

/// `image.reduceRegion(ee.Reducer.mean(), geometry, scale)`
pub fn reduce_region_mean(image: Node, geometry: Node, scale: f64) -> Node {
    Node::invoke(
        "Image.reduceRegion",
        [
            ("image", image),
            ("reducer", Node::invoke("Reducer.mean", Vec::<(&str, Node)>::new())),
            ("geometry", geometry),
            ("scale", Node::constant(scale)),
        ],
    )
}

pub fn dictionary_get(dictionary: Node, key: &str) -> Node {
    Node::invoke(
        "Dictionary.get",
        [("dictionary", dictionary), ("key", Node::constant(key))],
    )
}

pub fn get(object: Node, property: &str) -> Node {
    Node::invoke(
        "Element.get",
        [("object", object), ("property", Node::constant(property))],
    )
}

pub fn set(object: Node, key: &str, value: Node) -> Node {
    Node::invoke(
        "Element.set",
        [("object", object), ("key", Node::constant(key)), ("value", value)],
    )
}

/// `collection.aggregate_array(property)`
pub fn aggregate_array(collection: Node, property: &str) -> Node {
    Node::invoke(
        "AggregateFeatureCollection.array",
        [
            ("collection", collection),
            ("property", Node::constant(property)),
        ],
    )
}
