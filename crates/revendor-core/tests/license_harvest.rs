//! License extraction from sdist archives and destination resolution.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use revendor_core::config::VendorConfig;
use revendor_core::licenses::{extract_license, license_destination};
use revendor_core::paths::{RootKind, VendorRoot};
use zip::write::SimpleFileOptions;

fn vendor_root(path: &Path) -> VendorRoot {
    VendorRoot {
        path: path.to_path_buf(),
        kind: RootKind::Vendor,
    }
}

fn write_zip(path: &Path, members: &[(&str, &str)]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for &(name, content) in members {
        writer
            .start_file(name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

fn write_tar_gz(path: &Path, members: &[(&str, &str)]) {
    let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for &(name, content) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

#[test]
fn extracts_license_from_zip_sdist() {
    let tmp = tempfile::tempdir().unwrap();
    let root = vendor_root(&tmp.path().join("vendor"));
    fs::create_dir_all(root.path.join("six")).unwrap();

    let sdist = tmp.path().join("six-1.16.0.zip");
    write_zip(
        &sdist,
        &[
            ("six-1.16.0/six.py", "# code"),
            ("six-1.16.0/LICENSE", "MIT License"),
        ],
    );

    extract_license(&root, &sdist, &VendorConfig::default()).unwrap();

    assert_eq!(
        fs::read_to_string(root.path.join("six/LICENSE")).unwrap(),
        "MIT License"
    );
}

#[test]
fn extracts_license_from_tar_gz_sdist() {
    let tmp = tempfile::tempdir().unwrap();
    let root = vendor_root(&tmp.path().join("vendor"));
    fs::create_dir_all(root.path.join("requests")).unwrap();

    let sdist = tmp.path().join("requests-2.25.1.tar.gz");
    write_tar_gz(
        &sdist,
        &[
            ("requests-2.25.1/setup.py", "# setup"),
            ("requests-2.25.1/LICENSE", "Apache License 2.0"),
        ],
    );

    extract_license(&root, &sdist, &VendorConfig::default()).unwrap();

    assert_eq!(
        fs::read_to_string(root.path.join("requests/LICENSE")).unwrap(),
        "Apache License 2.0"
    );
}

#[test]
fn single_file_modules_get_a_flat_dotted_license() {
    let tmp = tempfile::tempdir().unwrap();
    let root = vendor_root(&tmp.path().join("vendor"));
    fs::create_dir_all(&root.path).unwrap();
    fs::write(root.path.join("six.py"), "# module").unwrap();

    let sdist = tmp.path().join("six-1.16.0.tar.gz");
    write_tar_gz(&sdist, &[("six-1.16.0/LICENSE", "MIT License")]);

    extract_license(&root, &sdist, &VendorConfig::default()).unwrap();

    assert_eq!(
        fs::read_to_string(root.path.join("six.LICENSE")).unwrap(),
        "MIT License"
    );
}

#[test]
fn nested_test_fixture_licenses_are_ignored() {
    let tmp = tempfile::tempdir().unwrap();
    let root = vendor_root(&tmp.path().join("vendor"));
    fs::create_dir_all(root.path.join("html5lib")).unwrap();

    let sdist = tmp.path().join("html5lib-1.1.zip");
    write_zip(
        &sdist,
        &[
            ("html5lib-1.1/html5lib/tests/testdata/LICENSE", "fixture"),
            ("html5lib-1.1/LICENSE", "real license"),
        ],
    );

    extract_license(&root, &sdist, &VendorConfig::default()).unwrap();

    assert_eq!(
        fs::read_to_string(root.path.join("html5lib/LICENSE")).unwrap(),
        "real license"
    );
}

#[test]
fn archive_without_license_and_without_fallback_url_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let root = vendor_root(&tmp.path().join("vendor"));
    fs::create_dir_all(&root.path).unwrap();

    let sdist = tmp.path().join("obscure-0.1.zip");
    write_zip(&sdist, &[("obscure-0.1/obscure.py", "# code")]);

    let mut config = VendorConfig::default();
    config.license_fallback_urls.clear();

    let err = extract_license(&root, &sdist, &config).unwrap_err();
    assert!(err.to_string().contains("No hardcoded license URL"));
}

#[test]
fn unrecognized_archive_types_are_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let root = vendor_root(&tmp.path().join("vendor"));
    fs::create_dir_all(&root.path).unwrap();

    let sdist = tmp.path().join("mystery-0.1.rar");
    fs::write(&sdist, b"not an sdist").unwrap();

    let err = extract_license(&root, &sdist, &VendorConfig::default()).unwrap_err();
    assert!(err.to_string().contains("Unsupported sdist archive type"));
}

#[test]
fn destination_prefers_exact_directory_match() {
    let tmp = tempfile::tempdir().unwrap();
    let root = vendor_root(tmp.path());
    fs::create_dir(root.path.join("six")).unwrap();

    let config = VendorConfig::default();
    assert_eq!(
        license_destination(&root, "six", "LICENSE", &config),
        root.path.join("six/LICENSE")
    );
}

#[test]
fn destination_falls_back_to_lowercased_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let root = vendor_root(tmp.path());
    fs::create_dir(root.path.join("click")).unwrap();

    let config = VendorConfig::default();
    assert_eq!(
        license_destination(&root, "Click", "LICENSE.txt", &config),
        root.path.join("click/LICENSE.txt")
    );
}

#[test]
fn destination_consults_the_rename_map() {
    let tmp = tempfile::tempdir().unwrap();
    let vendor = vendor_root(tmp.path());
    let config = VendorConfig::default();

    // No pip directory on disk; the rename map decides.
    assert_eq!(
        license_destination(&vendor, "pip", "LICENSE", &config),
        vendor.path.join("pip9/LICENSE")
    );

    let patched = VendorRoot {
        path: tmp.path().to_path_buf(),
        kind: RootKind::Patched,
    };
    assert_eq!(
        license_destination(&patched, "pip", "LICENSE", &config),
        patched.path.join("notpip/LICENSE")
    );
}

#[test]
fn destination_flattens_missing_override_submodules() {
    let tmp = tempfile::tempdir().unwrap();
    let root = vendor_root(tmp.path());
    // backports exists, but backports/weakref was flattened to a module.
    fs::create_dir(root.path.join("backports")).unwrap();

    let config = VendorConfig::default();
    assert_eq!(
        license_destination(&root, "backports.weakref", "LICENSE", &config),
        root.path.join("backports/weakref.LICENSE")
    );
}

#[test]
fn destination_uses_existing_override_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let root = vendor_root(tmp.path());
    fs::create_dir_all(root.path.join("backports/shutil_get_terminal_size")).unwrap();

    let config = VendorConfig::default();
    assert_eq!(
        license_destination(
            &root,
            "backports.shutil_get_terminal_size",
            "LICENSE",
            &config
        ),
        root.path.join("backports/shutil_get_terminal_size/LICENSE")
    );
}

#[test]
fn destination_defaults_to_flat_dotted_name() {
    let tmp = tempfile::tempdir().unwrap();
    let root = vendor_root(tmp.path());

    let config = VendorConfig::default();
    assert_eq!(
        license_destination(&root, "toml", "LICENSE", &config),
        root.path.join("toml.LICENSE")
    );
}
