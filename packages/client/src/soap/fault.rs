//! Built-in protocol fault shapes
//!
//! Both are ordinary bound types, so a custom fault type is declared the same
//! way and passed to a request in their place.

use crate::parser::{Declaration, XmlObject};

/// `soap:Fault` of SOAP 1.1
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Soap11Fault {
    pub fault_code: String,
    pub fault_string: String,
    pub fault_actor: Option<String>,
    pub detail: Option<String>,
}

impl XmlObject for Soap11Fault {
    fn declare(decl: &mut Declaration<Self>) {
        decl.root("//Envelope/Body/Fault")
            .constructor(Self::default)
            .text("fault_code", "faultcode", |f: &mut Self, v: String| f.fault_code = v)
            .text("fault_string", "faultstring", |f: &mut Self, v: String| f.fault_string = v)
            .text("fault_actor", "faultactor", |f: &mut Self, v| f.fault_actor = v)
            .text("detail", "detail", |f: &mut Self, v| f.detail = v);
    }
}

/// One language variant of a SOAP 1.2 fault reason
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FaultReason {
    pub lang: Option<String>,
    pub text: String,
}

impl XmlObject for FaultReason {
    fn declare(decl: &mut Declaration<Self>) {
        decl.constructor(Self::default)
            .text("lang", "@lang", |r: &mut Self, v| r.lang = v)
            .text("text", ".", |r: &mut Self, v: String| r.text = v);
    }
}

/// `env:Fault` of SOAP 1.2
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Soap12Fault {
    pub code: String,
    pub subcode: Option<String>,
    pub reasons: Vec<FaultReason>,
    pub node: Option<String>,
    pub role: Option<String>,
    pub detail: Option<String>,
}

impl Soap12Fault {
    /// Reason text for `lang`, falling back to the first reason
    #[must_use]
    pub fn reason(&self, lang: &str) -> Option<&str> {
        self.reasons
            .iter()
            .find(|reason| reason.lang.as_deref() == Some(lang))
            .or_else(|| self.reasons.first())
            .map(|reason| reason.text.as_str())
    }
}

impl XmlObject for Soap12Fault {
    fn declare(decl: &mut Declaration<Self>) {
        decl.root("//Envelope/Body/Fault")
            .constructor(Self::default)
            .text("code", "Code/Value", |f: &mut Self, v: String| f.code = v)
            .text("subcode", "Code/Subcode/Value", |f: &mut Self, v| f.subcode = v)
            .object("reasons", "Reason/Text", |f: &mut Self, r: FaultReason| {
                f.reasons.push(r);
            })
            .text("node", "Node", |f: &mut Self, v| f.node = v)
            .text("role", "Role", |f: &mut Self, v| f.role = v)
            .text("detail", "Detail", |f: &mut Self, v| f.detail = v);
    }
}
