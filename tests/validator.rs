//! Rename validation: uniqueness, conflicts, shadowing, and the commit
//! discipline of the mapping store.

mod common;

use std::sync::Arc;

use common::*;
use jarmap::code_attribute::Instruction;
use jarmap::entry::Entry;
use jarmap::index::JarIndex;
use jarmap::jar_utils::JarFile;
use jarmap::mapping::{EntryMapping, EntryRemapper, TokenType};
use jarmap::progress::NoProgress;
use jarmap::validation::Message;

/// `a extends b`. `b` carries members that renames of `a`'s members can
/// collide or shadow against.
fn validation_jar() -> JarFile {
    let mut b = ClassBuilder::new("b", ACC_PUBLIC, OBJECT);
    b.field(ACC_PUBLIC, "f", "I");
    b.field(ACC_PUBLIC | ACC_STATIC, "s", "I");
    b.method(ACC_PUBLIC, "a", "()Z", &[Instruction::Iconst0, Instruction::Ireturn]);
    b.method(ACC_PUBLIC | ACC_STATIC, "c", "()V", &[Instruction::Return]);
    b.method(ACC_PUBLIC, "b", "()I", &[Instruction::Iconst0, Instruction::Ireturn]);

    let mut a = ClassBuilder::new("a", ACC_PUBLIC, "b");
    a.field(ACC_PRIVATE, "x", "I");
    a.field(ACC_PRIVATE, "y", "I");
    a.field(ACC_PRIVATE, "g", "I");
    a.field(ACC_PRIVATE, "h", "Ljava/lang/String;");
    a.method(ACC_PUBLIC, "a", "()I", &[Instruction::Iconst0, Instruction::Ireturn]);
    a.method(ACC_PUBLIC, "b", "()V", &[Instruction::Return]);
    a.method(ACC_PRIVATE, "d", "()V", &[Instruction::Return]);
    a.method_with_params(
        ACC_PUBLIC,
        "p",
        "(II)V",
        &["left", "right"],
        &[Instruction::Return],
    );

    build_jar(vec![a, b])
}

fn remapper() -> EntryRemapper {
    let mut index = JarIndex::new();
    index.index_jar(&validation_jar(), &mut NoProgress).unwrap();
    EntryRemapper::new(Arc::new(index))
}

#[test]
fn non_unique_fields_are_rejected() {
    let mut remapper = remapper();
    let x = entry_of_field(remapper.jar_index(), "a", "x", "I");
    let y = entry_of_field(remapper.jar_index(), "a", "y", "I");

    let (committed, messages) =
        with_vc(|vc| remapper.put_mapping(vc, &x, EntryMapping::deobfuscated("field01")));
    assert!(committed);
    assert!(messages.is_empty());

    let (committed, messages) =
        with_vc(|vc| remapper.put_mapping(vc, &y, EntryMapping::deobfuscated("field01")));
    assert!(!committed);
    assert_eq!(messages, vec![Message::NonUniqueNameClass]);

    // The rejected commit left no trace.
    assert_eq!(remapper.deobf_mapping(&y), EntryMapping::default());
    assert_eq!(remapper.deobfuscate(&y).value, "y");
    assert_eq!(remapper.deobfuscate(&y).token_type, TokenType::Obfuscated);
}

#[test]
fn renaming_onto_an_obfuscated_sibling_conflicts() {
    let mut remapper = remapper();
    // "y" is still the obfuscated name of a sibling field.
    let x = entry_of_field(remapper.jar_index(), "a", "x", "I");
    let (committed, messages) =
        with_vc(|vc| remapper.put_mapping(vc, &x, EntryMapping::deobfuscated("y")));
    assert!(!committed);
    assert_eq!(messages, vec![Message::NonUniqueNameClass]);
}

#[test]
fn non_unique_methods_are_rejected() {
    let mut remapper = remapper();
    let first = entry_of_method(remapper.jar_index(), "a", "a", "()I");
    let second = entry_of_method(remapper.jar_index(), "a", "b", "()V");

    let (committed, _) =
        with_vc(|vc| remapper.put_mapping(vc, &first, EntryMapping::deobfuscated("method01")));
    assert!(committed);

    let (committed, messages) =
        with_vc(|vc| remapper.put_mapping(vc, &second, EntryMapping::deobfuscated("method01")));
    assert!(!committed);
    assert_eq!(messages, vec![Message::NonUniqueNameClass]);
}

#[test]
fn methods_conflict_across_the_hierarchy_despite_return_types() {
    let mut remapper = remapper();
    // b.a()Z is an ancestor method with the same (empty) parameter list.
    let ancestor = entry_of_method(remapper.jar_index(), "b", "a", "()Z");
    let (committed, _) =
        with_vc(|vc| remapper.put_mapping(vc, &ancestor, EntryMapping::deobfuscated("method01")));
    assert!(committed);

    let entry = entry_of_method(remapper.jar_index(), "a", "b", "()V");
    let (committed, messages) =
        with_vc(|vc| remapper.put_mapping(vc, &entry, EntryMapping::deobfuscated("method01")));
    assert!(!committed);
    assert_eq!(messages, vec![Message::NonUniqueNameClass]);
}

#[test]
fn static_ancestor_methods_still_conflict_with_instance_renames() {
    let mut remapper = remapper();
    let ancestor_static = entry_of_method(remapper.jar_index(), "b", "c", "()V");
    let (committed, _) = with_vc(|vc| {
        remapper.put_mapping(vc, &ancestor_static, EntryMapping::deobfuscated("method02"))
    });
    assert!(committed);

    let entry = entry_of_method(remapper.jar_index(), "a", "b", "()V");
    let (committed, messages) =
        with_vc(|vc| remapper.put_mapping(vc, &entry, EntryMapping::deobfuscated("method02")));
    assert!(!committed);
    assert_eq!(messages, vec![Message::NonUniqueNameClass]);
}

#[test]
fn private_methods_do_not_conflict_across_classes() {
    let mut remapper = remapper();
    // b has no private methods, so rename a's private method to a fresh
    // name used by nothing else, then check a cross-class private pair.
    let private_method = entry_of_method(remapper.jar_index(), "a", "d", "()V");
    let (committed, messages) = with_vc(|vc| {
        remapper.put_mapping(vc, &private_method, EntryMapping::deobfuscated("helper"))
    });
    assert!(committed);
    assert!(messages.is_empty());
}

#[test]
fn shadowing_warns_but_commits() {
    let mut remapper = remapper();
    let ancestor_field = entry_of_field(remapper.jar_index(), "b", "f", "I");
    let (committed, _) = with_vc(|vc| {
        remapper.put_mapping(vc, &ancestor_field, EntryMapping::deobfuscated("count"))
    });
    assert!(committed);

    // Same name on a subclass instance field shadows the ancestor's.
    let field = entry_of_field(remapper.jar_index(), "a", "g", "I");
    let (committed, messages) =
        with_vc(|vc| remapper.put_mapping(vc, &field, EntryMapping::deobfuscated("count")));
    assert!(committed, "shadowing is a warning, not a hard error");
    assert_eq!(messages, vec![Message::ShadowedNameClass]);
    assert_eq!(remapper.deobfuscate(&field).value, "count");
}

#[test]
fn static_mismatch_does_not_shadow() {
    let mut remapper = remapper();
    let ancestor_static = entry_of_field(remapper.jar_index(), "b", "s", "I");
    let (committed, _) = with_vc(|vc| {
        remapper.put_mapping(vc, &ancestor_static, EntryMapping::deobfuscated("tag"))
    });
    assert!(committed);

    let instance_field = entry_of_field(remapper.jar_index(), "a", "g", "I");
    let (committed, messages) =
        with_vc(|vc| remapper.put_mapping(vc, &instance_field, EntryMapping::deobfuscated("tag")));
    assert!(committed);
    assert!(messages.is_empty());
}

#[test]
fn illegal_identifiers_are_rejected() {
    let mut remapper = remapper();
    let field = entry_of_field(remapper.jar_index(), "a", "x", "I");

    let (committed, messages) =
        with_vc(|vc| remapper.put_mapping(vc, &field, EntryMapping::deobfuscated("2bad")));
    assert!(!committed);
    assert_eq!(messages, vec![Message::IllegalIdentifier]);

    let (committed, messages) =
        with_vc(|vc| remapper.put_mapping(vc, &field, EntryMapping::deobfuscated("class")));
    assert!(!committed);
    assert_eq!(messages, vec![Message::ReservedWord]);

    let class = Entry::Class(class_entry(remapper.jar_index(), "a"));
    let (committed, messages) = with_vc(|vc| {
        remapper.put_mapping(vc, &class, EntryMapping::deobfuscated("com/example/Alpha"))
    });
    assert!(committed, "package-qualified top-level class names are legal");
    assert!(messages.is_empty());

    let (committed, messages) = with_vc(|vc| {
        remapper.put_mapping(vc, &class, EntryMapping::deobfuscated("com//Broken"))
    });
    assert!(!committed);
    assert_eq!(messages, vec![Message::IllegalClassName]);
}

#[test]
fn class_renames_collide_with_obfuscated_and_mapped_names() {
    let mut remapper = remapper();
    let a = Entry::Class(class_entry(remapper.jar_index(), "a"));
    let b = Entry::Class(class_entry(remapper.jar_index(), "b"));

    // Renaming onto another class's obfuscated name collides.
    let (committed, messages) =
        with_vc(|vc| remapper.put_mapping(vc, &a, EntryMapping::deobfuscated("b")));
    assert!(!committed);
    assert_eq!(messages, vec![Message::NonUniqueName]);

    let (committed, _) =
        with_vc(|vc| remapper.put_mapping(vc, &a, EntryMapping::deobfuscated("Alpha")));
    assert!(committed);

    // Renaming onto another class's mapped name collides too.
    let (committed, messages) =
        with_vc(|vc| remapper.put_mapping(vc, &b, EntryMapping::deobfuscated("Alpha")));
    assert!(!committed);
    assert_eq!(messages, vec![Message::NonUniqueName]);
}

#[test]
fn parameter_names_are_unique_within_a_method() {
    let mut remapper = remapper();
    let first = Entry::LocalVariable(local_entry(remapper.jar_index(), "a", "p", "(II)V", 1));
    let second = Entry::LocalVariable(local_entry(remapper.jar_index(), "a", "p", "(II)V", 2));

    // The sibling parameter's debug name is taken.
    let (committed, messages) =
        with_vc(|vc| remapper.put_mapping(vc, &second, EntryMapping::deobfuscated("left")));
    assert!(!committed);
    assert_eq!(messages, vec![Message::NonUniqueNameClass]);

    let (committed, _) =
        with_vc(|vc| remapper.put_mapping(vc, &first, EntryMapping::deobfuscated("width")));
    assert!(committed);

    // A mapped sibling blocks its new name...
    let (committed, messages) =
        with_vc(|vc| remapper.put_mapping(vc, &second, EntryMapping::deobfuscated("width")));
    assert!(!committed);
    assert_eq!(messages, vec![Message::NonUniqueNameClass]);

    // ...but frees its old debug name.
    let (committed, messages) =
        with_vc(|vc| remapper.put_mapping(vc, &second, EntryMapping::deobfuscated("left")));
    assert!(committed);
    assert!(messages.is_empty());
}

#[test]
fn proposed_names_carry_their_provenance() {
    let mut remapper = remapper();
    let field = entry_of_field(remapper.jar_index(), "a", "x", "I");

    let (committed, _) =
        with_vc(|vc| remapper.put_mapping(vc, &field, EntryMapping::proposed("guessedName")));
    assert!(committed);

    let translated = remapper.deobfuscate(&field);
    assert_eq!(translated.value, "guessedName");
    assert_eq!(translated.token_type, TokenType::Proposed);
}

#[test]
fn docs_survive_without_a_rename() {
    let mut remapper = remapper();
    let field = entry_of_field(remapper.jar_index(), "a", "x", "I");

    let (committed, _) = with_vc(|vc| {
        remapper.put_mapping(
            vc,
            &field,
            EntryMapping::default().with_docs("Counts retries."),
        )
    });
    assert!(committed);

    assert_eq!(
        remapper.deobf_mapping(&field).javadoc.as_deref(),
        Some("Counts retries.")
    );
    // No rename: the field still shows its obfuscated name.
    assert_eq!(remapper.deobfuscate(&field).value, "x");
}

#[test]
fn rename_round_trip_survives_reindexing() {
    let jar = validation_jar();
    let mut index = JarIndex::new();
    index.index_jar(&jar, &mut NoProgress).unwrap();
    let mut remapper = EntryRemapper::new(Arc::new(index));

    let method = entry_of_method(remapper.jar_index(), "a", "a", "()I");
    let (committed, _) =
        with_vc(|vc| remapper.put_mapping(vc, &method, EntryMapping::deobfuscated("doStuff")));
    assert!(committed);
    assert_eq!(remapper.deobfuscate(&method).value, "doStuff");

    // Re-running the scan and attaching the same store preserves the
    // mapping: the store is independent of the index it overlays.
    let mut fresh_index = JarIndex::new();
    fresh_index.index_jar(&jar, &mut NoProgress).unwrap();
    let fresh_remapper =
        EntryRemapper::with_mappings(Arc::new(fresh_index), remapper.into_mappings());

    let method = entry_of_method(fresh_remapper.jar_index(), "a", "a", "()I");
    let translated = fresh_remapper.deobfuscate(&method);
    assert_eq!(translated.value, "doStuff");
    assert_eq!(translated.token_type, TokenType::Deobfuscated);
}

#[test]
fn delta_view_records_commits_for_synchronization() {
    let mut remapper = remapper();
    let field = entry_of_field(remapper.jar_index(), "a", "x", "I");

    let (_, _) = with_vc(|vc| remapper.put_mapping(vc, &field, EntryMapping::deobfuscated("one")));
    let delta = remapper.take_delta();
    assert_eq!(delta.added, vec![field.clone()]);

    let (_, _) = with_vc(|vc| remapper.put_mapping(vc, &field, EntryMapping::deobfuscated("two")));
    let (_, _) = with_vc(|vc| remapper.put_mapping(vc, &field, EntryMapping::default()));
    let delta = remapper.take_delta();
    assert_eq!(delta.changed, vec![field.clone()]);
    assert_eq!(delta.removed, vec![field]);
}
