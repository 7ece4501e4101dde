use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use roget_db::{LoadMode, NodeKind, ParseOptions, Thesaurus, WordType};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("roget_sample.txt")
}

fn load() -> Thesaurus {
    Thesaurus::load(fixture()).expect("load fixture")
}

#[test]
fn mmap_and_owned_buffers_build_the_same_tree() {
    let mapped = Thesaurus::load_with_mode(fixture(), LoadMode::Mmap).expect("mmap load");
    let owned = Thesaurus::load_with_mode(fixture(), LoadMode::Owned).expect("owned load");
    assert_eq!(mapped.node_count(), owned.node_count());
    assert_eq!(mapped.head_word_count(), 6);
    assert_eq!(owned.head_word_count(), 6);
    assert_eq!(mapped.key_count(), owned.key_count());
}

#[test]
fn hierarchy_follows_headers() {
    let thesaurus = load();
    let root = thesaurus.root();
    assert_eq!(root.children().len(), 1, "front matter adds nothing");

    let class = root.children().next().expect("class");
    assert_eq!(class.description(), Some("CLASS I"));
    assert_eq!(class.key(), "WORDS EXPRESSING ABSTRACT RELATIONS");

    let sections: Vec<_> = class.children().map(|s| s.key()).collect();
    assert_eq!(sections, vec!["EXISTENCE", "RELATION"]);

    let existence = thesaurus.head_word("1").expect("headword 1");
    let sub_section = existence.parent().expect("subsection");
    assert_eq!(sub_section.kind(), NodeKind::Category);
    assert_eq!(sub_section.key(), "1. BEING, IN THE ABSTRACT");
    assert_eq!(sub_section.description(), None);
    assert_eq!(sub_section.parent().map(|s| s.description()), Some(Some("SECTION I.")));

    let relation = thesaurus.head_word("5").expect("headword 5");
    assert_eq!(relation.parent().map(|c| c.key()), Some("Absolute relation"));
}

#[test]
fn headword_attributes() {
    let thesaurus = load();
    let relation = thesaurus.head_word("5").expect("headword 5");
    assert_eq!(relation.kind(), NodeKind::HeadWord);
    assert_eq!(relation.key(), "Relation");
    assert_eq!(relation.index(), Some("5"));
    assert_eq!(relation.link_comment(), Some("Absolute"));

    let irrelation = thesaurus.head_word("5a").expect("lettered headword");
    assert_eq!(irrelation.key(), "Irrelation");
    let linked = irrelation.children().last().expect("link-only sense");
    assert_eq!(linked.kind(), NodeKind::Sense);
    assert_eq!(linked.link(), Some(relation));
    assert_eq!(linked.key(), "Relation");
    assert_eq!(linked.word_type(), WordType::Verb);

    assert!(thesaurus.head_word("6").is_none(), "text after end marker");
}

#[test]
fn senses_carry_comments_and_word_types() {
    let thesaurus = load();
    let ens = thesaurus.senses("ens");
    assert_eq!(ens.len(), 1);
    assert_eq!(ens[0].comment(), Some("Lat"));
    assert_eq!(ens[0].parent().map(|p| p.kind()), Some(NodeKind::SenseGroup));

    assert_eq!(thesaurus.senses("existence")[0].word_type(), WordType::Noun);
    assert_eq!(thesaurus.senses("positiveness")[0].word_type(), WordType::Adjective);
    assert_eq!(thesaurus.senses("to the purpose")[0].word_type(), WordType::Phrase);

    let nothingness = thesaurus.senses("nothingness");
    assert_eq!(nothingness[0].link().and_then(|n| n.index()), Some("2"));
    assert!(thesaurus.senses("never parsed").is_empty());
}

#[test]
fn similarity_tiers() {
    let thesaurus = load();
    assert_eq!(thesaurus.similarity("being", "entity").score, 100);
    assert_eq!(thesaurus.similarity("existence", "subsistence").score, 100);
    assert_eq!(thesaurus.similarity("reality", "being").score, 90);
    assert_eq!(thesaurus.similarity("nothingness", "Inexistence").score, 90);
    assert_eq!(thesaurus.similarity("Relation", "Irrelation").score, 90);
    assert_eq!(thesaurus.similarity("thing", "baseless").score, 80);
    assert_eq!(thesaurus.similarity("being", "thing").score, 0);
    assert_eq!(thesaurus.similarity("being", "unknown word").score, 0);
}

#[test]
fn ids_follow_document_order_and_indices_are_consistent() {
    let thesaurus = load();
    let ids: Vec<_> = thesaurus.iter_nodes().map(|n| n.id()).collect();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    for node in thesaurus.iter_nodes() {
        for child in node.children() {
            assert!(node.id() < child.id());
            assert_eq!(child.parent(), Some(node));
        }
    }

    let mut seen = HashSet::new();
    for index in thesaurus.head_word_indices() {
        assert!(seen.insert(index.to_string()));
        let head = thesaurus.head_word(index).expect("indexed headword");
        assert_eq!(head.index(), Some(index));
    }

    for node in thesaurus.iter_nodes().filter(|n| n.kind().is_sense()) {
        let ids = thesaurus.sense_ids(node.key());
        assert!(ids.contains(&node.id()));
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

#[test]
fn malformed_headword_aborts_the_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.txt");
    fs::write(
        &path,
        "CLASS I\nAbstract\n\n1. Existence -- N. being.\n\nSee also -- the appendix.\n",
    )
    .expect("write source");

    let err = Thesaurus::load(&path).err().expect("parse fails");
    let message = format!("{err:#}");
    assert!(message.contains("malformed headword definition"), "{message}");
    assert!(message.contains("line 6"), "{message}");
}

#[test]
fn custom_end_marker_and_empty_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("short.txt");
    fs::write(
        &path,
        "CLASS I\nAbstract\n\n1. Existence -- N. being.\n\n*** END ***\n\n2. Later -- N. x.\n",
    )
    .expect("write source");
    let options = ParseOptions {
        end_marker: "*** END ***".to_string(),
    };
    let thesaurus =
        Thesaurus::load_with_options(&path, LoadMode::Owned, &options).expect("load");
    assert_eq!(thesaurus.head_word_count(), 1);

    let empty = dir.path().join("empty.txt");
    fs::write(&empty, "").expect("write empty");
    let thesaurus = Thesaurus::load(&empty).expect("empty loads");
    assert_eq!(thesaurus.node_count(), 1);
}
