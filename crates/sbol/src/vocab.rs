//! Well-known namespaces, qualified names and term URIs.
//!
//! SBOL2 names live in [`sbol2`], the legacy SBOL1 vocabulary in [`sbol1`],
//! and ontology terms used as field values in [`terms`].

use crate::tree::QName;

/// SBOL2 namespace.
pub const SBOL2_NS: &str = "http://sbols.org/v2#";
/// SBOL1 namespace. Its presence in a document's bindings selects V1 reading.
pub const SBOL1_NS: &str = "http://sbols.org/v1#";
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
pub const PROV_NS: &str = "http://www.w3.org/ns/prov#";
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

/// Returns the conventional prefix for a namespace, if it is one we know.
pub fn known_prefix(namespace: &str) -> Option<&'static str> {
    match namespace {
        SBOL2_NS => Some("sbol"),
        SBOL1_NS => Some("s1"),
        DCTERMS_NS => Some("dcterms"),
        PROV_NS => Some("prov"),
        RDF_NS => Some("rdf"),
        XSD_NS => Some("xsd"),
        _ => None,
    }
}

pub const RDF_TYPE: QName = QName::from_static(RDF_NS, "type", "rdf");
/// Placeholder type for nested nodes that carry no `rdf:type`.
pub const RDF_DESCRIPTION: QName = QName::from_static(RDF_NS, "Description", "rdf");

pub const TITLE: QName = QName::from_static(DCTERMS_NS, "title", "dcterms");
pub const DESCRIPTION: QName = QName::from_static(DCTERMS_NS, "description", "dcterms");
pub const WAS_DERIVED_FROM: QName = QName::from_static(PROV_NS, "wasDerivedFrom", "prov");

/// SBOL2 classes and properties.
pub mod sbol2 {
    use super::SBOL2_NS;
    use crate::tree::QName;

    const fn sbol(local: &'static str) -> QName {
        QName::from_static(SBOL2_NS, local, "sbol")
    }

    // Classes
    pub const COLLECTION: QName = sbol("Collection");
    pub const MODULE_DEFINITION: QName = sbol("ModuleDefinition");
    pub const MODEL: QName = sbol("Model");
    pub const COMPONENT_DEFINITION: QName = sbol("ComponentDefinition");
    pub const SEQUENCE: QName = sbol("Sequence");
    pub const COMPONENT: QName = sbol("Component");
    pub const FUNCTIONAL_COMPONENT: QName = sbol("FunctionalComponent");
    pub const MODULE: QName = sbol("Module");
    pub const INTERACTION: QName = sbol("Interaction");
    pub const PARTICIPATION: QName = sbol("Participation");
    pub const MAPS_TO: QName = sbol("MapsTo");
    pub const SEQUENCE_ANNOTATION: QName = sbol("SequenceAnnotation");
    pub const SEQUENCE_CONSTRAINT: QName = sbol("SequenceConstraint");
    pub const RANGE: QName = sbol("Range");
    pub const CUT: QName = sbol("Cut");
    pub const GENERIC_LOCATION: QName = sbol("GenericLocation");
    pub const MULTI_RANGE: QName = sbol("MultiRange");

    // Identified
    pub const PERSISTENT_IDENTITY: QName = sbol("persistentIdentity");
    pub const DISPLAY_ID: QName = sbol("displayId");
    pub const VERSION: QName = sbol("version");

    // Properties
    pub const TYPE: QName = sbol("type");
    pub const ROLE: QName = sbol("role");
    pub const SEQUENCE_PROP: QName = sbol("sequence");
    pub const COMPONENT_PROP: QName = sbol("component");
    pub const SEQUENCE_ANNOTATION_PROP: QName = sbol("sequenceAnnotation");
    pub const SEQUENCE_CONSTRAINT_PROP: QName = sbol("sequenceConstraint");
    pub const ELEMENTS: QName = sbol("elements");
    pub const ENCODING: QName = sbol("encoding");
    pub const DEFINITION: QName = sbol("definition");
    pub const ACCESS: QName = sbol("access");
    pub const DIRECTION: QName = sbol("direction");
    pub const MAPS_TO_PROP: QName = sbol("mapsTo");
    pub const LOCAL: QName = sbol("local");
    pub const REMOTE: QName = sbol("remote");
    pub const REFINEMENT: QName = sbol("refinement");
    pub const LOCATION: QName = sbol("location");
    pub const START: QName = sbol("start");
    pub const END: QName = sbol("end");
    pub const AT: QName = sbol("at");
    pub const ORIENTATION: QName = sbol("orientation");
    pub const RANGE_PROP: QName = sbol("range");
    pub const SUBJECT: QName = sbol("subject");
    pub const OBJECT: QName = sbol("object");
    pub const RESTRICTION: QName = sbol("restriction");
    pub const FUNCTIONAL_COMPONENT_PROP: QName = sbol("functionalComponent");
    pub const MODULE_PROP: QName = sbol("module");
    pub const INTERACTION_PROP: QName = sbol("interaction");
    pub const MODEL_PROP: QName = sbol("model");
    pub const PARTICIPATION_PROP: QName = sbol("participation");
    pub const PARTICIPANT: QName = sbol("participant");
    pub const SOURCE: QName = sbol("source");
    pub const LANGUAGE: QName = sbol("language");
    pub const FRAMEWORK: QName = sbol("framework");
    pub const MEMBER: QName = sbol("member");
}

/// SBOL1 classes and properties.
pub mod sbol1 {
    use super::SBOL1_NS;
    use crate::tree::QName;

    const fn s1(local: &'static str) -> QName {
        QName::from_static(SBOL1_NS, local, "s1")
    }

    pub const DNA_COMPONENT: QName = s1("DnaComponent");
    pub const DNA_SEQUENCE: QName = s1("DnaSequence");
    pub const SEQUENCE_ANNOTATION: QName = s1("SequenceAnnotation");
    pub const COLLECTION: QName = s1("Collection");

    pub const DISPLAY_ID: QName = s1("displayId");
    pub const NAME: QName = s1("name");
    pub const DESCRIPTION: QName = s1("description");
    pub const ANNOTATION: QName = s1("annotation");
    pub const DNA_SEQUENCE_PROP: QName = s1("dnaSequence");
    pub const NUCLEOTIDES: QName = s1("nucleotides");
    pub const BIO_START: QName = s1("bioStart");
    pub const BIO_END: QName = s1("bioEnd");
    pub const STRAND: QName = s1("strand");
    pub const SUB_COMPONENT: QName = s1("subComponent");
    pub const PRECEDES: QName = s1("precedes");
    pub const COMPONENT: QName = s1("component");
}

/// Ontology terms used as field values.
pub mod terms {
    /// BioPAX DNA region, the component type of every V1 DnaComponent.
    pub const DNA: &str = "http://www.biopax.org/release/biopax-level3.owl#DnaRegion";
    pub const RNA: &str = "http://www.biopax.org/release/biopax-level3.owl#RnaRegion";
    pub const PROTEIN: &str = "http://www.biopax.org/release/biopax-level3.owl#Protein";
    pub const SMALL_MOLECULE: &str = "http://www.biopax.org/release/biopax-level3.owl#SmallMolecule";
    pub const COMPLEX: &str = "http://www.biopax.org/release/biopax-level3.owl#Complex";

    /// IUPAC nucleotide encoding, the only encoding V1 can carry.
    pub const IUPAC_DNA: &str = "http://www.chem.qmul.ac.uk/iubmb/misc/naseq.html";
    pub const IUPAC_RNA: &str = "http://www.chem.qmul.ac.uk/iubmb/misc/naseq.html";
    pub const IUPAC_PROTEIN: &str = "http://www.chem.qmul.ac.uk/iupac/AminoAcid/";
    pub const SMILES: &str = "http://www.opensmiles.org/opensmiles.html";

    /// Sequence Ontology prefix used by SBOL2.
    pub const SO_NS: &str = "http://identifiers.org/so/SO:";
    /// Sequence Ontology prefix used by SBOL1.
    pub const PURL_SO_NS: &str = "http://purl.obolibrary.org/obo/SO_";
    /// SO:0000804, engineered region. Default role for bridged V1 parts.
    pub const ENGINEERED_REGION: &str = "http://identifiers.org/so/SO:0000804";
    pub const PROMOTER: &str = "http://identifiers.org/so/SO:0000167";
    pub const CDS: &str = "http://identifiers.org/so/SO:0000316";
    pub const TERMINATOR: &str = "http://identifiers.org/so/SO:0000141";

    pub const EDAM_NS: &str = "http://identifiers.org/edam/";
    pub const SBML: &str = "http://identifiers.org/edam/format_2585";
    pub const CELLML: &str = "http://identifiers.org/edam/format_3240";
    pub const BIOPAX: &str = "http://identifiers.org/edam/format_3156";

    /// Rewrites an SBOL1 (purl) SO term into its SBOL2 form.
    pub fn so_from_v1(role: &str) -> String {
        match role.strip_prefix(PURL_SO_NS) {
            Some(term) => format!("{SO_NS}{term}"),
            None => role.to_string(),
        }
    }

    /// Rewrites an SBOL2 SO term into its SBOL1 (purl) form.
    pub fn so_to_v1(role: &str) -> String {
        role.replace(SO_NS, PURL_SO_NS)
    }
}

/// Returns true when `predicate` on a node of type `subject_type` owns its
/// object, i.e. the object is serialized as a nested node.
pub fn is_owning(subject_type: &QName, predicate: &QName) -> bool {
    let (ns, class, prop) = (
        &*subject_type.namespace,
        &*subject_type.local,
        &*predicate.local,
    );
    if predicate.namespace != subject_type.namespace {
        return false;
    }
    match ns {
        SBOL2_NS => matches!(
            (class, prop),
            ("ComponentDefinition", "component" | "sequenceAnnotation" | "sequenceConstraint")
                | ("SequenceAnnotation", "location")
                | ("MultiRange", "range")
                | ("Component" | "FunctionalComponent" | "Module", "mapsTo")
                | ("ModuleDefinition", "functionalComponent" | "module" | "interaction")
                | ("Interaction", "participation")
        ),
        SBOL1_NS => matches!(
            (class, prop),
            ("DnaComponent", "annotation" | "dnaSequence")
                | ("SequenceAnnotation", "subComponent")
                | ("Collection", "component")
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owning_is_type_aware() {
        assert!(is_owning(&sbol2::COMPONENT_DEFINITION, &sbol2::COMPONENT_PROP));
        // SequenceAnnotation.component is a reference, not ownership
        assert!(!is_owning(&sbol2::SEQUENCE_ANNOTATION, &sbol2::COMPONENT_PROP));
        assert!(is_owning(&sbol1::SEQUENCE_ANNOTATION, &sbol1::SUB_COMPONENT));
        assert!(!is_owning(&sbol2::COMPONENT_DEFINITION, &sbol1::ANNOTATION));
    }

    #[test]
    fn test_so_remap() {
        assert_eq!(
            terms::so_to_v1("http://identifiers.org/so/SO:0000167"),
            "http://purl.obolibrary.org/obo/SO_0000167"
        );
        assert_eq!(
            terms::so_from_v1("http://purl.obolibrary.org/obo/SO_0000167"),
            terms::PROMOTER
        );
        assert_eq!(terms::so_from_v1("http://example.org/x"), "http://example.org/x");
    }

    #[test]
    fn test_known_prefix() {
        assert_eq!(known_prefix(SBOL2_NS), Some("sbol"));
        assert_eq!(known_prefix("http://example.org/"), None);
    }
}
