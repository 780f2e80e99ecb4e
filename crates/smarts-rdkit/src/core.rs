use pyo3::ffi::c_str;
use pyo3::prelude::*;
use pyo3::types::PyModule;
use std::ffi::CString;
use std::sync::OnceLock;

static RDKIT_MODULE: OnceLock<Py<PyModule>> = OnceLock::new();

pub fn init_python() -> PyResult<()> {
    Python::attach(|py| {
        let code = CString::new(include_str!("../python/rdkit_wrapper.py"))?;
        let module = PyModule::from_code(py, code.as_c_str(), c_str!("rdkit_wrapper.py"), c_str!("rdkit_wrapper"))?;
        // Guardamos el módulo en el OnceLock como Py<PyModule>
        RDKIT_MODULE.set(module.unbind()).ok();
        Ok(())
    })
}

fn get_module(py: Python<'_>) -> PyResult<Py<PyModule>> {
    RDKIT_MODULE.get().map(|module| module.clone_ref(py)).ok_or_else(|| {
                                                             PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(
            "init_python() debe llamarse antes de usar el módulo RDKit"
        )
                                                         })
}

/// SMILES canónico de una estructura; falla si RDKit no la parsea.
pub fn canonical_smiles(smiles: &str) -> PyResult<String> {
    Python::attach(|py| {
        let rdkit_py = get_module(py)?;
        let rdkit = rdkit_py.bind(py);
        let canon: String = rdkit.getattr("canonical_smiles")?.call1((smiles,))?.extract()?;
        Ok(canon)
    })
}

/// Depicción SVG con átomos resaltados (índices base 0).
pub fn depict_svg(smiles: &str, highlight_atoms: &[u32], width: u32, height: u32) -> PyResult<String> {
    Python::attach(|py| {
        let rdkit_py = get_module(py)?;
        let rdkit = rdkit_py.bind(py);
        let svg: String = rdkit.getattr("depict_svg")?
                               .call1((smiles, highlight_atoms.to_vec(), width, height))?
                               .extract()?;
        Ok(svg)
    })
}
