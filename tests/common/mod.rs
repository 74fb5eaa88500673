//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdf_keyword_merge::config::Settings;
use pdf_keyword_merge::extract::TextExtractor;
use pdf_keyword_merge::pdf::{Merger, SizeCompressor};
use pdf_keyword_merge::services::KeywordMergeService;

/// Write a single-page PDF showing `text`, creating parent directories.
pub fn write_text_pdf(path: &Path, text: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 18.into()]),
            Operation::new("Td", vec![50.into(), 750.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let media_box: Vec<Object> = vec![0.into(), 0.into(), 595.into(), 842.into()];
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => media_box,
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        },
    });
    let kids: Vec<Object> = vec![page_id.into()];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

pub fn page_count(path: &Path) -> usize {
    Document::load(path).unwrap().get_pages().len()
}

/// Settings that keep every output under `root`.
pub fn settings_in(root: &Path) -> Settings {
    Settings {
        output_dir: root.join("out"),
        tmp_dir: root.join("tmp"),
        ..Settings::default()
    }
}

/// A service without Ghostscript, so results do not depend on the host.
pub fn library_only_service(settings: Settings) -> KeywordMergeService {
    let tmp: PathBuf = settings.tmp_dir.clone();
    KeywordMergeService::with_components(
        settings,
        TextExtractor::new(None, tmp.clone()),
        Merger::new(None),
        SizeCompressor::new(None, tmp),
    )
}

pub fn read_report(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
