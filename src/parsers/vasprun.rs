//! # VASP vasprun.xml 解析器
//!
//! 解析 VASP 的 XML 输出 vasprun.xml，提取本征值、占据数、费米能级和 k 点。
//!
//! ## vasprun.xml 结构（相关部分）
//! ```text
//! <modeling>
//!   <kpoints>
//!     <varray name="kpointlist"> <v> k1 k2 k3 </v> ... </varray>
//!   </kpoints>
//!   <calculation> ... </calculation>          # 结构优化的中间步
//!   <calculation>                             # 最后一步
//!     <eigenvalues>
//!       <array>
//!         <field>eigene</field> <field>occ</field>
//!         <set>
//!           <set comment="spin 1">
//!             <set comment="kpoint 1"> <r> e occ </r> ... </set>
//!     <dos> <i name="efermi"> 1.2345 </i> </dos>
//!   </calculation>
//! </modeling>
//! ```
//!
//! 一个文件可能包含多个 `<calculation>`，只使用最后一个，
//! 绝不合并或回退到之前的步骤。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/electronic.rs`
//! - 使用 `roxmltree` 解析 XML 树

use super::{finish_structure, OutputReader};
use crate::error::{BandkitError, Result};
use crate::models::ElectronicStructure;
use roxmltree::{Document, Node};
use std::fs;
use std::path::Path;

const FORMAT: &str = "vasprun.xml";

/// vasprun.xml 读取器
#[derive(Debug, Clone, Copy, Default)]
pub struct VasprunReader;

impl OutputReader for VasprunReader {
    fn read(&self, path: &Path) -> Result<ElectronicStructure> {
        parse_vasprun_file(path)
    }
}

/// 解析 vasprun.xml 文件
pub fn parse_vasprun_file(path: &Path) -> Result<ElectronicStructure> {
    if !path.exists() {
        return Err(BandkitError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let bytes = fs::read(path).map_err(|e| BandkitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let label = path.display().to_string();
    let content = decode_bytes(bytes, &label)?;

    parse_vasprun_content(&content, &label)
}

/// 按 XML 声明的编码解码文件内容
///
/// VASP 声明 `encoding="ISO-8859-1"`，此时逐字节映射为字符；
/// 其余情况（包括未声明）按 UTF-8 解码。
fn decode_bytes(bytes: Vec<u8>, label: &str) -> Result<String> {
    match declared_encoding(&bytes).as_deref() {
        Some("iso-8859-1" | "iso_8859-1" | "latin1" | "latin-1") => {
            Ok(bytes.iter().map(|&b| char::from(b)).collect())
        }
        _ => String::from_utf8(bytes)
            .map_err(|e| parse_error(label, format!("not valid UTF-8: {}", e))),
    }
}

/// XML 声明中的 `encoding` 值（小写）
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    let decl = head.trim_start_matches('\u{feff}').trim_start();
    if !decl.starts_with("<?xml") {
        return None;
    }
    let decl = &decl[..decl.find("?>")?];

    let rest = &decl[decl.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    let end = value.find(quote)?;

    Some(value[..end].trim().to_ascii_lowercase())
}

/// 从字符串内容解析 vasprun.xml
pub fn parse_vasprun_content(content: &str, label: &str) -> Result<ElectronicStructure> {
    let doc = Document::parse(content).map_err(|e| parse_error(label, e.to_string()))?;
    let root = doc.root_element();

    if root.tag_name().name() != "modeling" {
        return Err(schema_error(label, "<modeling> root element"));
    }

    let last_step = root
        .children()
        .filter(|n| n.has_tag_name("calculation"))
        .last()
        .ok_or_else(|| schema_error(label, "<calculation>"))?;

    let (eigenvalues, occupations) = parse_eigenvalues(last_step, label)?;
    let fermi_energy = parse_fermi_energy(last_step, label)?;
    let kpoints = parse_kpoints(root, last_step, label)?;

    finish_structure(
        FORMAT,
        label,
        ElectronicStructure::new(eigenvalues, kpoints, fermi_energy, occupations),
    )
}

type Levels = Vec<Vec<Vec<f64>>>;

/// 解析 `<eigenvalues>` 块，返回 (本征值, 占据数)
fn parse_eigenvalues(step: Node, label: &str) -> Result<(Levels, Option<Levels>)> {
    let array = child(step, "eigenvalues")
        .and_then(|n| child(n, "array"))
        .ok_or_else(|| schema_error(label, "calculation/eigenvalues/array"))?;

    let fields: Vec<&str> = array
        .children()
        .filter(|n| n.has_tag_name("field"))
        .map(|n| n.text().unwrap_or("").trim())
        .collect();

    let energy_col = fields
        .iter()
        .position(|f| *f == "eigene")
        .ok_or_else(|| schema_error(label, "eigenvalues <field>eigene</field>"))?;
    let occ_col = fields.iter().position(|f| *f == "occ");

    let spin_sets: Vec<Node> = child(array, "set")
        .ok_or_else(|| schema_error(label, "eigenvalues/array/set"))?
        .children()
        .filter(|n| n.has_tag_name("set"))
        .collect();

    if spin_sets.is_empty() {
        return Err(schema_error(label, "eigenvalues spin <set>"));
    }

    let mut eigenvalues = Vec::with_capacity(spin_sets.len());
    let mut occupations = Vec::with_capacity(spin_sets.len());

    for spin_set in spin_sets {
        let mut spin_eigs = Vec::new();
        let mut spin_occs = Vec::new();

        for kpoint_set in spin_set.children().filter(|n| n.has_tag_name("set")) {
            let mut levels = Vec::new();
            let mut occs = Vec::new();

            for row in kpoint_set.children().filter(|n| n.has_tag_name("r")) {
                let values = parse_numbers(row, label)?;
                let energy = values.get(energy_col).copied().ok_or_else(|| {
                    parse_error(label, format!("eigenvalue row has {} columns", values.len()))
                })?;
                levels.push(energy);

                if let Some(col) = occ_col {
                    let occ = values.get(col).copied().ok_or_else(|| {
                        parse_error(label, format!("eigenvalue row has {} columns", values.len()))
                    })?;
                    occs.push(occ);
                }
            }

            spin_eigs.push(levels);
            spin_occs.push(occs);
        }

        eigenvalues.push(spin_eigs);
        occupations.push(spin_occs);
    }

    let occupations = occ_col.map(|_| occupations);
    Ok((eigenvalues, occupations))
}

/// 解析 `<dos><i name="efermi">`
fn parse_fermi_energy(step: Node, label: &str) -> Result<f64> {
    let node = child(step, "dos")
        .and_then(|dos| {
            dos.children()
                .find(|n| n.has_tag_name("i") && n.attribute("name") == Some("efermi"))
        })
        .ok_or_else(|| schema_error(label, "calculation/dos/i[name=efermi]"))?;

    let text = node.text().unwrap_or("").trim();
    text.parse::<f64>()
        .map_err(|_| parse_error(label, format!("invalid Fermi energy '{}'", text)))
}

/// 解析属于最后一步的 k 点列表
///
/// 优先使用最后一个 `<calculation>` 内部的 `<kpoints>`，
/// 否则使用它之前最后出现的文档级 `<kpoints>`。
fn parse_kpoints(root: Node, last_step: Node, label: &str) -> Result<Vec<[f64; 3]>> {
    let kpoints_node = match child(last_step, "kpoints") {
        Some(node) => node,
        None => root
            .children()
            .take_while(|n| *n != last_step)
            .filter(|n| n.has_tag_name("kpoints"))
            .last()
            .ok_or_else(|| schema_error(label, "<kpoints>"))?,
    };

    let list = kpoints_node
        .children()
        .find(|n| n.has_tag_name("varray") && n.attribute("name") == Some("kpointlist"))
        .ok_or_else(|| schema_error(label, "kpoints/varray[name=kpointlist]"))?;

    list.children()
        .filter(|n| n.has_tag_name("v"))
        .map(|v| {
            let values = parse_numbers(v, label)?;
            match values.as_slice() {
                [a, b, c] => Ok([*a, *b, *c]),
                _ => Err(parse_error(
                    label,
                    format!("k-point has {} components, expected 3", values.len()),
                )),
            }
        })
        .collect()
}

/// 第一个指定标签的子元素
fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

/// 解析元素文本中以空白分隔的数值
fn parse_numbers(node: Node, label: &str) -> Result<Vec<f64>> {
    node.text()
        .unwrap_or("")
        .split_whitespace()
        .map(|w| {
            w.parse::<f64>().map_err(|_| {
                parse_error(
                    label,
                    format!("invalid number '{}' in <{}>", w, node.tag_name().name()),
                )
            })
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const SINGLE_STEP: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<modeling>
 <generator>
  <i name="program" type="string">vasp</i>
 </generator>
 <kpoints>
  <varray name="kpointlist" >
   <v>       0.00000000       0.00000000       0.00000000 </v>
   <v>       0.50000000       0.00000000       0.00000000 </v>
  </varray>
 </kpoints>
 <calculation>
  <eigenvalues>
   <array>
    <dimension dim="1">band</dimension>
    <dimension dim="2">kpoint</dimension>
    <dimension dim="3">spin</dimension>
    <field>eigene</field>
    <field>occ</field>
    <set>
     <set comment="spin 1">
      <set comment="kpoint 1">
       <r>   -1.0000    1.0000 </r>
       <r>    1.0000    0.0000 </r>
      </set>
      <set comment="kpoint 2">
       <r>   -0.5000    1.0000 </r>
       <r>    0.8000    0.0000 </r>
      </set>
     </set>
    </set>
   </array>
  </eigenvalues>
  <dos>
   <i name="efermi">      0.00000000 </i>
  </dos>
 </calculation>
</modeling>
"#;

    #[test]
    fn test_parse_single_step() {
        let es = parse_vasprun_content(SINGLE_STEP, "vasprun.xml").unwrap();

        assert_eq!(es.num_spins(), 1);
        assert_eq!(es.num_kpoints(), 2);
        assert_eq!(es.num_bands(), 2);
        assert!((es.fermi_energy() - 0.0).abs() < 1e-12);
        assert_eq!(es.kpoints()[1], [0.5, 0.0, 0.0]);
        assert_eq!(es.eigenvalues(0).unwrap()[1], vec![-0.5, 0.8]);
        assert_eq!(es.occupations(0).unwrap().unwrap()[0], vec![1.0, 0.0]);
    }

    #[test]
    fn test_multi_step_uses_last_calculation() {
        let content = r#"<modeling>
 <kpoints>
  <varray name="kpointlist">
   <v> 0.0 0.0 0.0 </v>
  </varray>
 </kpoints>
 <calculation>
  <eigenvalues><array>
   <field>eigene</field><field>occ</field>
   <set><set comment="spin 1"><set comment="kpoint 1">
    <r> -5.0 1.0 </r><r> 5.0 0.0 </r>
   </set></set></set>
  </array></eigenvalues>
  <dos><i name="efermi"> 1.0 </i></dos>
 </calculation>
 <calculation>
  <eigenvalues><array>
   <field>eigene</field><field>occ</field>
   <set><set comment="spin 1"><set comment="kpoint 1">
    <r> -2.0 1.0 </r><r> 3.0 0.0 </r>
   </set></set></set>
  </array></eigenvalues>
  <dos><i name="efermi"> 0.25 </i></dos>
 </calculation>
</modeling>
"#;
        let es = parse_vasprun_content(content, "relax.xml").unwrap();

        assert_eq!(es.eigenvalues(0).unwrap()[0], vec![-2.0, 3.0]);
        assert!((es.fermi_energy() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_last_step_without_eigenvalues_is_schema_error() {
        let content = r#"<modeling>
 <kpoints><varray name="kpointlist"><v> 0 0 0 </v></varray></kpoints>
 <calculation>
  <eigenvalues><array>
   <field>eigene</field>
   <set><set comment="spin 1"><set comment="kpoint 1"><r> -1.0 </r></set></set></set>
  </array></eigenvalues>
  <dos><i name="efermi"> 0.0 </i></dos>
 </calculation>
 <calculation>
  <energy><i name="e_fr_energy"> -10.0 </i></energy>
 </calculation>
</modeling>
"#;
        let err = parse_vasprun_content(content, "broken.xml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn test_step_local_kpoints_preferred() {
        let content = r#"<modeling>
 <kpoints><varray name="kpointlist"><v> 0 0 0 </v></varray></kpoints>
 <calculation>
  <kpoints><varray name="kpointlist"><v> 0.25 0.25 0 </v></varray></kpoints>
  <eigenvalues><array>
   <field>eigene</field>
   <set><set comment="spin 1"><set comment="kpoint 1"><r> -1.0 </r></set></set></set>
  </array></eigenvalues>
  <dos><i name="efermi"> 0.0 </i></dos>
 </calculation>
</modeling>
"#;
        let es = parse_vasprun_content(content, "nscf.xml").unwrap();
        assert_eq!(es.kpoints(), &[[0.25, 0.25, 0.0]]);
        assert!(!es.has_occupations());
    }

    #[test]
    fn test_spin_polarized() {
        let content = r#"<modeling>
 <kpoints><varray name="kpointlist"><v> 0 0 0 </v></varray></kpoints>
 <calculation>
  <eigenvalues><array>
   <field>eigene</field><field>occ</field>
   <set>
    <set comment="spin 1"><set comment="kpoint 1"><r> -1.0 1.0 </r><r> 1.0 0.0 </r></set></set>
    <set comment="spin 2"><set comment="kpoint 1"><r> -0.8 1.0 </r><r> 1.2 0.0 </r></set></set>
   </set>
  </array></eigenvalues>
  <dos><i name="efermi"> 0.0 </i></dos>
 </calculation>
</modeling>
"#;
        let es = parse_vasprun_content(content, "ispin2.xml").unwrap();
        assert!(es.is_spin_polarized());
        assert_eq!(es.eigenvalues(1).unwrap()[0], vec![-0.8, 1.2]);
    }

    #[test]
    fn test_missing_fermi_is_schema_error() {
        let content = SINGLE_STEP.replace(r#"<i name="efermi">      0.00000000 </i>"#, "");
        let err = parse_vasprun_content(&content, "nofermi.xml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn test_malformed_number_is_parse_error() {
        let content = SINGLE_STEP.replace("-0.5000", "-0.5x00");
        let err = parse_vasprun_content(&content, "bad.xml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let content = SINGLE_STEP.replace("0.50000000       0.00000000       0.00000000", "0.5 0.0");
        let err = parse_vasprun_content(&content, "bad.xml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_ragged_kpoints_is_parse_error() {
        let content = SINGLE_STEP.replace("<r>    0.8000    0.0000 </r>", "");
        let err = parse_vasprun_content(&content, "ragged.xml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_not_xml_is_parse_error() {
        let err = parse_vasprun_content("this is not <xml", "junk.xml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = parse_vasprun_content("<root/>", "other.xml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn test_missing_file() {
        let err = parse_vasprun_file(Path::new("/nonexistent/vasprun.xml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_latin1_file_with_non_ascii_system_name() {
        // 0xC5 (Å) 在 ISO-8859-1 中合法，但不是合法的 UTF-8
        let (head, tail) = SINGLE_STEP.split_once("<generator>").unwrap();
        let mut bytes = head.as_bytes().to_vec();
        bytes.extend_from_slice(b"<generator>\n  <i name=\"system\" type=\"string\">Mo\xC5S2</i>");
        bytes.extend_from_slice(tail.as_bytes());

        let path = std::env::temp_dir().join(format!("bandkit-latin1-{}.xml", std::process::id()));
        std::fs::write(&path, &bytes).unwrap();
        let result = parse_vasprun_file(&path);
        std::fs::remove_file(&path).ok();

        let es = result.unwrap();
        assert_eq!(es.num_kpoints(), 2);
        assert_eq!(es.eigenvalues(0).unwrap()[1], vec![-0.5, 0.8]);
    }

    #[test]
    fn test_declared_encoding() {
        assert_eq!(
            declared_encoding(br#"<?xml version="1.0" encoding="ISO-8859-1"?><modeling/>"#).as_deref(),
            Some("iso-8859-1")
        );
        assert_eq!(
            declared_encoding(b"<?xml version='1.0' encoding = 'UTF-8' ?><modeling/>").as_deref(),
            Some("utf-8")
        );
        assert_eq!(declared_encoding(br#"<?xml version="1.0"?><modeling/>"#), None);
        assert_eq!(declared_encoding(b"<modeling/>"), None);
    }

    #[test]
    fn test_invalid_utf8_without_latin1_declaration() {
        let err = decode_bytes(b"<modeling>Mo\xC5S2</modeling>".to_vec(), "bad.xml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let content = decode_bytes(
            b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><modeling>\xC5</modeling>".to_vec(),
            "latin1.xml",
        )
        .unwrap();
        assert!(content.ends_with("<modeling>\u{c5}</modeling>"));
    }
}
