//! Pattern tables and single-object materialization

mod common;

use std::sync::Arc;

use xsoap_client::prelude::*;
use xsoap_client::xpath::XPathParser;

#[derive(Debug, Default)]
struct Record {
    id: i32,
    name: String,
}

impl XmlObject for Record {
    fn declare(decl: &mut Declaration<Self>) {
        decl.root("//Envelope/Body/Active/record")
            .root("//Envelope/Body/Archived/record")
            .constructor(Self::default)
            .text("id", "id", |r: &mut Self, v: i32| r.id = v)
            .text("name", "name", |r: &mut Self, v: String| r.name = v);
    }
}

#[derive(Debug, Default, Clone)]
struct Customer {
    name: String,
}

impl XmlObject for Customer {
    fn declare(decl: &mut Declaration<Self>) {
        decl.constructor(Self::default)
            .text("name", "name", |c: &mut Self, v: String| c.name = v);
    }
}

#[derive(Debug, Default, Clone)]
struct Line {
    sku: String,
    qty: i32,
}

impl XmlObject for Line {
    fn declare(decl: &mut Declaration<Self>) {
        decl.constructor(Self::default)
            .text("sku", "@sku", |l: &mut Self, v: String| l.sku = v)
            .text("qty", "qty", |l: &mut Self, v: i32| l.qty = v);
    }
}

#[derive(Debug, Default)]
struct Order {
    id: i64,
    customer: Option<Customer>,
    lines: Vec<Line>,
    usd: f64,
    eur: f64,
}

impl XmlObject for Order {
    fn declare(decl: &mut Declaration<Self>) {
        decl.root("//Envelope/Body/GetOrderResponse/order")
            .constructor(Self::default)
            .text("id", "@id", |o: &mut Self, v: i64| o.id = v)
            .object("customer", "customer", |o: &mut Self, c: Customer| o.customer = Some(c))
            .object("lines", "lines/line", |o: &mut Self, l: Line| o.lines.push(l))
            .text("usd", "total[@currency='USD']", |o: &mut Self, v: f64| o.usd = v)
            .text("eur", "total[@currency='EUR']", |o: &mut Self, v: f64| o.eur = v);
    }
}

const ORDER: &str = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <GetOrderResponse>
      <order id="42">
        <customer><name>Ada</name></customer>
        <lines>
          <line sku="A-1"><qty>3</qty></line>
          <line sku="B-2"><qty>5</qty></line>
        </lines>
        <total currency="EUR">9.50</total>
        <total currency="USD">10.25</total>
      </order>
    </GetOrderResponse>
  </soap:Body>
</soap:Envelope>"#;

#[derive(Debug)]
struct Flags {
    count: i32,
    enabled: bool,
    letter: char,
    label: Option<String>,
    marked: i32,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            count: 7,
            enabled: true,
            letter: 'x',
            label: Some("preset".to_string()),
            marked: 9,
        }
    }
}

impl XmlObject for Flags {
    fn declare(decl: &mut Declaration<Self>) {
        decl.root("/flags")
            .constructor(Self::default)
            .text("count", "count", |f: &mut Self, v: i32| f.count = v)
            .text("enabled", "enabled", |f: &mut Self, v: bool| f.enabled = v)
            .text("letter", "letter", |f: &mut Self, v: char| f.letter = v)
            .text("label", "label", |f: &mut Self, v: Option<String>| f.label = v)
            .text("marked", "marked", |f: &mut Self, v: i32| f.marked = v)
            .nil_attribute("absent");
    }
}

#[derive(Debug, Default)]
struct Unbound;

impl XmlObject for Unbound {
    fn declare(decl: &mut Declaration<Self>) {
        decl.root("/a");
    }
}

#[derive(Debug, Default)]
struct Duplicated {
    value: i32,
}

impl XmlObject for Duplicated {
    fn declare(decl: &mut Declaration<Self>) {
        decl.root("/a")
            .constructor(Self::default)
            .text("first", "value", |d: &mut Self, v: i32| d.value = v)
            .text("second", "value", |d: &mut Self, v: i32| d.value = v);
    }
}

#[derive(Debug, Default)]
struct Malformed;

impl XmlObject for Malformed {
    fn declare(decl: &mut Declaration<Self>) {
        decl.root("/a")
            .constructor(Self::default)
            .text("broken", "b[@x='1'", |_: &mut Self, _v: String| {});
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Sub {
    v: i32,
}

impl XmlObject for Sub {
    fn declare(decl: &mut Declaration<Self>) {
        decl.constructor(Self::default)
            .text("v", "v", |s: &mut Self, v: i32| s.v = v);
    }
}

#[derive(Debug, Default)]
struct Tally {
    ids: Vec<i32>,
    subs: Vec<Sub>,
    name: String,
}

impl XmlObject for Tally {
    fn declare(decl: &mut Declaration<Self>) {
        decl.root("/doc")
            .constructor(Self::default)
            .text("ids", "./id", |t: &mut Self, v: i32| t.ids.push(v))
            .object("subs", "sub", |t: &mut Self, s: Sub| t.subs.push(s))
            .text("name", "name", |t: &mut Self, v: String| t.name = v);
    }
}

#[derive(Debug, Default)]
struct SelfNested {
    inner: Option<Sub>,
}

impl XmlObject for SelfNested {
    fn declare(decl: &mut Declaration<Self>) {
        decl.root("/doc")
            .constructor(Self::default)
            .object("inner", ".", |n: &mut Self, s: Sub| n.inner = Some(s));
    }
}

#[derive(Debug, Default)]
struct AttributeNested {
    inner: Option<Sub>,
}

impl XmlObject for AttributeNested {
    fn declare(decl: &mut Declaration<Self>) {
        decl.root("/doc")
            .constructor(Self::default)
            .object("inner", "sub/@ref", |n: &mut Self, s: Sub| n.inner = Some(s));
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Code(String);

impl XmlValue for Code {}

#[derive(Debug, Default)]
struct Coded {
    code: Code,
}

impl XmlObject for Coded {
    fn declare(decl: &mut Declaration<Self>) {
        decl.root("/a")
            .constructor(Self::default)
            .text("code", "code", |c: &mut Self, v: Code| c.code = v);
    }
}

#[derive(Debug, Default)]
struct Transformed {
    code: Code,
}

impl XmlObject for Transformed {
    fn declare(decl: &mut Declaration<Self>) {
        decl.root("/a")
            .constructor(Self::default)
            .text_with(
                "code",
                "code",
                |text: &str| -> std::result::Result<Code, std::convert::Infallible> {
                    Ok(Code(text.trim().to_uppercase()))
                },
                |t: &mut Self, v: Code| t.code = v,
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_fields_resolve_under_every_root() {
        let parser = Parser::<Record>::new().expect("record parser compiles");
        assert_eq!(parser.roots().len(), 2);
        assert_eq!(parser.patterns().len(), 4);

        let archived = XPathParser::compile_root("/Envelope/Body/Archived/record/name")
            .expect("absolute chain compiles");
        assert_eq!(parser.field_at(&archived), Some("name"));
    }

    #[test]
    fn test_either_root_materializes() {
        let parser = Parser::<Record>::new().expect("record parser compiles");
        let record = parser
            .parse_str(
                "<Envelope><Body><Archived><record><id>9</id><name> old </name></record>\
                 </Archived></Body></Envelope>",
            )
            .expect("archived record parses");
        assert_eq!(record.id, 9);
        assert_eq!(record.name, " old ");
    }

    #[test]
    fn test_nested_objects_and_attributes() {
        let parser = Parser::<Order>::new().expect("order parser compiles");
        let order = parser.parse_str(ORDER).expect("order parses");

        assert_eq!(order.id, 42);
        assert_eq!(order.customer.as_ref().map(|c| c.name.as_str()), Some("Ada"));
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].sku, "A-1");
        assert_eq!(order.lines[0].qty, 3);
        assert_eq!(order.lines[1].sku, "B-2");
        assert_eq!(order.lines[1].qty, 5);
        assert!((order.usd - 10.25).abs() < f64::EPSILON);
        assert!((order.eur - 9.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_nested_parsers_are_cached_per_chain() {
        let parser = Parser::<Order>::new().expect("order parser compiles");
        assert_eq!(parser.nested_count(), 0);

        parser.parse_str(ORDER).expect("first parse");
        parser.parse_str(ORDER).expect("second parse");
        assert_eq!(parser.nested_count(), 2);

        let chain = XPathParser::compile_root("//Envelope/Body/GetOrderResponse/order/lines/line")
            .expect("line chain compiles");
        let first = parser.nested_parser::<Line>(&chain).expect("line parser");
        let second = parser.nested_parser::<Line>(&chain).expect("line parser");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(parser.nested_count(), 2);
    }

    #[test]
    fn test_nested_chain_rejects_another_type() {
        let parser = Parser::<Order>::new().expect("order parser compiles");
        let chain = XPathParser::compile_root("/Envelope/Body/GetOrderResponse/order/customer")
            .expect("customer chain compiles");
        parser.nested_parser::<Customer>(&chain).expect("customer parser");

        let err = parser.nested_parser::<Line>(&chain).expect_err("chain already bound");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_nil_elements_store_null_equivalents() {
        let parser = Parser::<Flags>::new().expect("flags parser compiles");
        let xsi = r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#;
        let xml = format!(
            r#"<flags {xsi}>
                 <count xsi:nil="true">5</count>
                 <enabled xsi:nil="1"/>
                 <letter xsi:nil="true"/>
                 <label xsi:nil="true"/>
                 <marked absent="true"/>
               </flags>"#
        );
        let flags = parser.parse_str(&xml).expect("flags parse");

        assert_eq!(flags.count, 0);
        assert!(!flags.enabled);
        assert_eq!(flags.letter, '\0');
        assert_eq!(flags.label, None);
        assert_eq!(flags.marked, 0);
    }

    #[test]
    fn test_custom_nil_marker_replaces_default() {
        let parser = Parser::<Flags>::new().expect("flags parser compiles");
        let xml = r#"<flags xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
                       <marked xsi:nil="true">3</marked>
                     </flags>"#;
        let flags = parser.parse_str(xml).expect("flags parse");
        assert_eq!(flags.marked, 3);
    }

    #[test]
    fn test_empty_text_leaves_field_untouched() {
        let parser = Parser::<Flags>::new().expect("flags parser compiles");
        let flags = parser
            .parse_str("<flags><count>  </count><letter/></flags>")
            .expect("flags parse");
        assert_eq!(flags.count, 7);
        assert_eq!(flags.letter, 'x');
    }

    #[test]
    fn test_char_keeps_whitespace() {
        let parser = Parser::<Flags>::new().expect("flags parser compiles");
        let flags = parser.parse_str("<flags><letter> </letter></flags>").expect("flags parse");
        assert_eq!(flags.letter, ' ');
    }

    #[test]
    fn test_list_fields_collect_interleaved_matches() {
        let parser = Parser::<Tally>::new().expect("tally parser compiles");
        let tally = parser
            .parse_str(
                "<doc><id>1</id><sub><v>7</v></sub><name/><id>2</id><x/>\
                 <sub><v>8</v></sub><id>3</id></doc>",
            )
            .expect("tally parses");
        assert_eq!(tally.ids, vec![1, 2, 3]);
        assert_eq!(tally.subs, vec![Sub { v: 7 }, Sub { v: 8 }]);
    }

    #[test]
    fn test_list_fields_without_matches_stay_empty() {
        let parser = Parser::<Tally>::new().expect("tally parser compiles");
        let tally = parser.parse_str("<doc><name/></doc>").expect("tally parses");
        assert!(tally.ids.is_empty());
        assert!(tally.subs.is_empty());
        assert!(tally.name.is_empty());
    }

    #[test]
    fn test_invalid_utf8_text_is_data_format() {
        let parser = Parser::<Tally>::new().expect("tally parser compiles");
        let mut source: &[u8] = b"<doc><id>1</id><name>a\xFFb</name></doc>";
        let err = parser.parse(&mut source).expect_err("invalid UTF-8");
        assert!(err.is_data_format());
    }

    #[test]
    fn test_object_fields_must_select_a_child_element() {
        let on_root = Parser::<SelfNested>::new().expect_err("object bound to its own root");
        assert!(on_root.is_configuration());

        let on_attribute =
            Parser::<AttributeNested>::new().expect_err("object bound to an attribute");
        assert!(on_attribute.is_configuration());
    }

    #[test]
    fn test_coercion_failure_is_data_format() {
        let parser = Parser::<Flags>::new().expect("flags parser compiles");
        let err = parser.parse_str("<flags><count>many</count></flags>").expect_err("not an int");
        assert!(err.is_data_format());
    }

    #[test]
    fn test_missing_root_is_data_format() {
        let parser = Parser::<Flags>::new().expect("flags parser compiles");
        let err = parser.parse_str("<other/>").expect_err("no root");
        assert!(err.is_data_format());
    }

    #[test]
    fn test_truncated_document_is_data_format() {
        let parser = Parser::<Flags>::new().expect("flags parser compiles");
        let err = parser.parse_str("<flags><count>1</count>").expect_err("truncated");
        assert!(err.is_data_format());
    }

    #[test]
    fn test_configuration_errors() {
        let missing_constructor = Parser::<Unbound>::new().expect_err("no constructor");
        assert!(missing_constructor.is_configuration());

        let duplicate = Parser::<Duplicated>::new().expect_err("duplicate chain");
        assert!(duplicate.is_configuration());

        let malformed = Parser::<Malformed>::new().expect_err("unclosed predicate");
        assert!(malformed.is_configuration());

        let uncoercible = Parser::<Coded>::new().expect_err("no coercion for Code");
        assert!(uncoercible.is_configuration());
    }

    #[test]
    fn test_transform_binds_custom_types() {
        let parser = Parser::<Transformed>::new().expect("transform parser compiles");
        let value = parser.parse_str("<a><code> ab </code></a>").expect("parse");
        assert_eq!(value.code, Code("AB".to_string()));
    }

    #[test]
    fn test_matches_document_only_on_root() {
        let parser = Parser::<Soap11Fault>::new().expect("fault parser compiles");
        assert!(parser.matches_document(common::FAULT_RESPONSE.as_bytes()));
        assert!(!parser.matches_document(common::ITEMS_RESPONSE.as_bytes()));

        let fault = parser.parse_str(common::FAULT_RESPONSE).expect("fault parses");
        assert_eq!(fault.fault_code, "soap:Server");
        assert_eq!(fault.fault_string, "Item store unavailable");
        assert_eq!(fault.fault_actor, None);
    }

    #[test]
    fn test_soap12_fault_with_reasons() {
        let xml = r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope">
          <env:Body>
            <env:Fault>
              <env:Code>
                <env:Value>env:Sender</env:Value>
                <env:Subcode><env:Value>m:BadItem</env:Value></env:Subcode>
              </env:Code>
              <env:Reason>
                <env:Text xml:lang="en">Unknown item</env:Text>
                <env:Text xml:lang="de">Unbekannter Artikel</env:Text>
              </env:Reason>
            </env:Fault>
          </env:Body>
        </env:Envelope>"#;

        let parser = Parser::<Soap12Fault>::new().expect("fault parser compiles");
        let fault = parser.parse_str(xml).expect("fault parses");
        assert_eq!(fault.code, "env:Sender");
        assert_eq!(fault.subcode.as_deref(), Some("m:BadItem"));
        assert_eq!(fault.reasons.len(), 2);
        assert_eq!(fault.reason("de"), Some("Unbekannter Artikel"));
        assert_eq!(fault.node, None);
    }
}
