// build.rs
fn main() {
    #[cfg(windows)]
    {
        let mut res = winres::WindowsResource::new();
        res.set("FileDescription", "fam8 report download and progress-workbook update");
        res.set("ProductName", "fam8_progress");
        if let Err(e) = res.compile() {
            println!("cargo:warning=windows resources not embedded: {e}");
        }
    }
}
