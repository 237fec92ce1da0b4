//! The constant module-descriptor document and its well-known paths.

/// Canonical in-archive path of the module descriptor.
pub const DESCRIPTOR_PATH: &str = "src/main/resources/META-INF/kmodule.xml";

/// Staging prefix under which rule sources land, preserving their path
/// relative to the source root.
pub const RULES_PREFIX: &str = "src/main/resources/rules";

/// Compilation-unit name declared by the descriptor.
pub const DEFAULT_KBASE: &str = "defaultKBase";

/// Execution-unit name declared by the descriptor.
pub const DEFAULT_KSESSION: &str = "defaultKSession";

const MODULE_DESCRIPTOR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kmodule xmlns="http://www.drools.org/xsd/kmodule">
  <kbase name="defaultKBase">
    <ksession name="defaultKSession" type="stateless"/>
  </kbase>
</kmodule>
"#;

/// The fixed descriptor: one compilation unit ([`DEFAULT_KBASE`]) holding one
/// stateless execution unit ([`DEFAULT_KSESSION`]). Identical for every
/// bundle this pipeline produces.
///
/// Byte-exact reproduction matters: archives built by earlier versions of
/// the pipeline carry this exact document, and loaders resolve session names
/// against it.
pub fn module_descriptor() -> &'static str {
    MODULE_DESCRIPTOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_is_byte_exact() {
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                        <kmodule xmlns=\"http://www.drools.org/xsd/kmodule\">\n  \
                        <kbase name=\"defaultKBase\">\n    \
                        <ksession name=\"defaultKSession\" type=\"stateless\"/>\n  \
                        </kbase>\n\
                        </kmodule>\n";
        assert_eq!(module_descriptor(), expected);
    }

    #[test]
    fn descriptor_declares_the_default_units() {
        let doc = module_descriptor();
        assert!(doc.contains(&format!("<kbase name=\"{DEFAULT_KBASE}\"")));
        assert!(doc.contains(&format!(
            "<ksession name=\"{DEFAULT_KSESSION}\" type=\"stateless\"/>"
        )));
    }
}
