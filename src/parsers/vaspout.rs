//! # VASP vaspout.h5 解析器
//!
//! 解析 VASP 6 的 HDF5 输出 vaspout.h5。只读取 `results` 组，
//! 不要求 `input/` 或中间数据存在。
//!
//! ## 数据集布局
//! ```text
//! results/electron_eigenvalues/eigenvalues     [spin][kpoint][band]  (eV)
//! results/electron_eigenvalues/kpoint_coords   [kpoint][3]
//! results/electron_eigenvalues/fermiweights    [spin][kpoint][band]  (可选)
//! results/electron_dos/efermi                  标量                   (eV)
//! ```
//!
//! 布局解码通过 [`DatasetSource`] 完成：HDF5 文件（`hdf5` feature）和
//! 内存中的 [`MemorySource`] 都实现了该 trait。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/electronic.rs`
//! - 使用 `hdf5` crate（可选 feature）

use super::{finish_structure, OutputReader};
use crate::error::{BandkitError, Result};
use crate::models::ElectronicStructure;
use std::collections::HashMap;
use std::path::Path;

const FORMAT: &str = "vaspout.h5";

pub const EIGENVALUES: &str = "results/electron_eigenvalues/eigenvalues";
pub const KPOINT_COORDS: &str = "results/electron_eigenvalues/kpoint_coords";
pub const FERMI_WEIGHTS: &str = "results/electron_eigenvalues/fermiweights";
pub const EFERMI: &str = "results/electron_dos/efermi";

/// 原始数据集：形状 + 行优先展平数据
#[derive(Debug, Clone, PartialEq)]
pub struct RawDataset {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

/// 按名称读取数值数据集的数据源
pub trait DatasetSource {
    /// 用于错误信息的数据源名称（通常为文件路径）
    fn label(&self) -> String;

    /// 数据集是否存在
    fn contains(&self, name: &str) -> bool;

    /// 读取数据集
    fn read_dataset(&self, name: &str) -> Result<RawDataset>;
}

/// 内存数据源
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    label: String,
    datasets: HashMap<String, RawDataset>,
}

impl MemorySource {
    pub fn new(label: impl Into<String>) -> Self {
        MemorySource {
            label: label.into(),
            datasets: HashMap::new(),
        }
    }

    /// 添加数据集
    pub fn with_dataset(mut self, name: &str, shape: Vec<usize>, data: Vec<f64>) -> Self {
        self.datasets
            .insert(name.to_string(), RawDataset { shape, data });
        self
    }
}

impl DatasetSource for MemorySource {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn contains(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    fn read_dataset(&self, name: &str) -> Result<RawDataset> {
        self.datasets
            .get(name)
            .cloned()
            .ok_or_else(|| schema_error(&self.label, name))
    }
}

/// vaspout.h5 读取器
#[derive(Debug, Clone, Copy, Default)]
pub struct VaspoutReader;

impl OutputReader for VaspoutReader {
    fn read(&self, path: &Path) -> Result<ElectronicStructure> {
        parse_vaspout_file(path)
    }
}

/// 解析 vaspout.h5 文件
pub fn parse_vaspout_file(path: &Path) -> Result<ElectronicStructure> {
    if !path.exists() {
        return Err(BandkitError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    decode_h5_file(path)
}

#[cfg(feature = "hdf5")]
fn decode_h5_file(path: &Path) -> Result<ElectronicStructure> {
    let source = h5::H5Source::open(path)?;
    decode_vaspout(&source)
}

#[cfg(not(feature = "hdf5"))]
fn decode_h5_file(path: &Path) -> Result<ElectronicStructure> {
    Err(BandkitError::UnsupportedFormat(format!(
        "{}: reading vaspout.h5 requires bandkit built with the `hdf5` feature",
        path.display()
    )))
}

/// 从数据源解码 vaspout.h5 布局
pub fn decode_vaspout<S: DatasetSource>(source: &S) -> Result<ElectronicStructure> {
    let label = source.label();

    let eigen = require(source, EIGENVALUES)?;
    let [num_spins, num_kpoints, num_bands] = dims3(&eigen, EIGENVALUES, &label)?;
    let eigenvalues = unflatten(&eigen.data, num_spins, num_kpoints, num_bands);

    let coords = require(source, KPOINT_COORDS)?;
    check_len(&coords, KPOINT_COORDS, &label)?;
    if coords.shape.len() != 2 || coords.shape[1] != 3 {
        return Err(parse_error(
            &label,
            format!("{} has shape {:?}, expected [nkpts, 3]", KPOINT_COORDS, coords.shape),
        ));
    }
    let kpoints: Vec<[f64; 3]> = coords
        .data
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();

    let efermi = require(source, EFERMI)?;
    check_len(&efermi, EFERMI, &label)?;
    let fermi_energy = match efermi.data.as_slice() {
        [e] => *e,
        _ => {
            return Err(parse_error(
                &label,
                format!("{} holds {} values, expected a scalar", EFERMI, efermi.data.len()),
            ))
        }
    };

    let occupations = if source.contains(FERMI_WEIGHTS) {
        let weights = source.read_dataset(FERMI_WEIGHTS)?;
        check_len(&weights, FERMI_WEIGHTS, &label)?;
        if weights.shape != eigen.shape {
            return Err(parse_error(
                &label,
                format!(
                    "{} has shape {:?}, eigenvalues have {:?}",
                    FERMI_WEIGHTS, weights.shape, eigen.shape
                ),
            ));
        }
        Some(unflatten(&weights.data, num_spins, num_kpoints, num_bands))
    } else {
        None
    };

    finish_structure(
        FORMAT,
        &label,
        ElectronicStructure::new(eigenvalues, kpoints, fermi_energy, occupations),
    )
}

/// 读取必需数据集，缺失时报 schema 错误
fn require<S: DatasetSource>(source: &S, name: &str) -> Result<RawDataset> {
    if !source.contains(name) {
        return Err(schema_error(&source.label(), name));
    }
    source.read_dataset(name)
}

/// 数据长度必须与形状一致
fn check_len(ds: &RawDataset, name: &str, label: &str) -> Result<()> {
    let expected: usize = ds.shape.iter().product();
    if ds.data.len() != expected {
        return Err(parse_error(
            label,
            format!(
                "{} holds {} values but its shape {:?} implies {}",
                name,
                ds.data.len(),
                ds.shape,
                expected
            ),
        ));
    }
    Ok(())
}

fn dims3(ds: &RawDataset, name: &str, label: &str) -> Result<[usize; 3]> {
    check_len(ds, name, label)?;
    match ds.shape.as_slice() {
        [s, k, b] => Ok([*s, *k, *b]),
        _ => Err(parse_error(
            label,
            format!("{} has shape {:?}, expected [spin, kpoint, band]", name, ds.shape),
        )),
    }
}

fn unflatten(data: &[f64], num_spins: usize, num_kpoints: usize, num_bands: usize) -> Vec<Vec<Vec<f64>>> {
    (0..num_spins)
        .map(|s| {
            (0..num_kpoints)
                .map(|k| {
                    let start = (s * num_kpoints + k) * num_bands;
                    data[start..start + num_bands].to_vec()
                })
                .collect()
        })
        .collect()
}

fn schema_error(label: &str, missing: &str) -> BandkitError {
    BandkitError::SchemaError {
        format: FORMAT.to_string(),
        path: label.to_string(),
        missing: missing.to_string(),
    }
}

fn parse_error(label: &str, reason: String) -> BandkitError {
    BandkitError::ParseError {
        format: FORMAT.to_string(),
        path: label.to_string(),
        reason,
    }
}

#[cfg(feature = "hdf5")]
mod h5 {
    use super::{parse_error, schema_error, DatasetSource, RawDataset};
    use crate::error::{BandkitError, Result};
    use std::path::Path;

    /// HDF5 文件数据源
    pub struct H5Source {
        file: hdf5::File,
        label: String,
    }

    impl H5Source {
        pub fn open(path: &Path) -> Result<Self> {
            let label = path.display().to_string();
            let file = hdf5::File::open(path).map_err(|e| BandkitError::FileReadError {
                path: label.clone(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
            })?;
            Ok(H5Source { file, label })
        }
    }

    impl DatasetSource for H5Source {
        fn label(&self) -> String {
            self.label.clone()
        }

        fn contains(&self, name: &str) -> bool {
            // 逐级检查，避免对不存在的中间组调用 H5Lexists
            let mut prefix = String::new();
            for part in name.split('/') {
                if !prefix.is_empty() {
                    prefix.push('/');
                }
                prefix.push_str(part);
                if !self.file.link_exists(&prefix) {
                    return false;
                }
            }
            true
        }

        fn read_dataset(&self, name: &str) -> Result<RawDataset> {
            let ds = self
                .file
                .dataset(name)
                .map_err(|_| schema_error(&self.label, name))?;
            let shape = ds.shape();
            let data = ds
                .read_raw::<f64>()
                .map_err(|e| parse_error(&self.label, format!("{}: {}", name, e)))?;
            Ok(RawDataset { shape, data })
        }
    }
}


#[cfg(all(test, feature = "hdf5"))]
mod h5_tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::path::PathBuf;

    type Entry = (&'static str, Vec<usize>, Vec<f64>);

    fn entries() -> Vec<Entry> {
        vec![
            (
                EIGENVALUES,
                vec![2, 2, 2],
                vec![-1.0, 1.0, 0.8, -0.5, -1.1, 0.9, -0.7, 1.2],
            ),
            (
                FERMI_WEIGHTS,
                vec![2, 2, 2],
                vec![1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0],
            ),
            (KPOINT_COORDS, vec![2, 3], vec![0.0, 0.0, 0.0, 1.0 / 3.0, 1.0 / 3.0, 0.0]),
            (EFERMI, vec![], vec![0.05]),
        ]
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bandkit-{}-{}.h5", name, std::process::id()))
    }

    /// 按 vaspout.h5 的组层级写出数据集，空形状写为标量
    fn write_vaspout(path: &Path, entries: &[Entry]) -> hdf5::Result<()> {
        let file = hdf5::File::create(path)?;
        for (name, shape, data) in entries {
            let (group_path, leaf) = name.rsplit_once('/').unwrap();
            let mut group = file.group("/")?;
            for part in group_path.split('/') {
                group = if group.link_exists(part) {
                    group.group(part)?
                } else {
                    group.create_group(part)?
                };
            }

            let builder = group.new_dataset::<f64>();
            let ds = if shape.is_empty() {
                builder.shape(()).create(*leaf)?
            } else {
                builder.shape(shape.clone()).create(*leaf)?
            };
            ds.write_raw(data)?;
        }
        Ok(())
    }

    fn memory_source(entries: &[Entry]) -> MemorySource {
        entries
            .iter()
            .fold(MemorySource::new("memory"), |src, (name, shape, data)| {
                src.with_dataset(name, shape.clone(), data.clone())
            })
    }

    #[test]
    fn test_h5_file_matches_memory_decode() {
        let path = temp_path("results");
        write_vaspout(&path, &entries()).unwrap();
        let from_file = parse_vaspout_file(&path);
        std::fs::remove_file(&path).ok();

        let from_file = from_file.unwrap();
        let from_memory = decode_vaspout(&memory_source(&entries())).unwrap();

        assert_eq!(from_file, from_memory);
        assert!((from_file.fermi_energy() - 0.05).abs() < 1e-12);
        assert_eq!(from_file.eigenvalues(1).unwrap()[1], vec![-0.7, 1.2]);
        assert!(from_file.has_occupations());
    }

    #[test]
    fn test_h5_missing_group_is_schema_error() {
        let partial: Vec<Entry> = entries()
            .into_iter()
            .filter(|(name, _, _)| *name != EFERMI)
            .collect();

        let path = temp_path("no-dos");
        write_vaspout(&path, &partial).unwrap();
        let result = parse_vaspout_file(&path);
        std::fs::remove_file(&path).ok();

        match result.unwrap_err() {
            BandkitError::SchemaError { missing, .. } => assert_eq!(missing, EFERMI),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_hdf5_file_is_read_error() {
        let path = temp_path("text");
        std::fs::write(&path, "not an HDF5 file\n").unwrap();
        let result = parse_vaspout_file(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(result.unwrap_err().kind(), ErrorKind::Io);
    }
}
