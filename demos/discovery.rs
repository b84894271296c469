use wakachi::{detect_system_dictionary, detect_with_library, MecabConfigCommand, MecabLibrary};

fn main() {
    let declared = detect_system_dictionary(&MecabConfigCommand);
    println!("available: {}", declared.is_available);
    println!("dictionary parent: {}", declared.dictionary_path.display());
    println!("engine dictionary: {}", declared.engine_dictionary().display());
    println!("declared charset: {}", declared.charset);

    match MecabLibrary::load_default() {
        Ok(library) => {
            println!("library version: {}", library.version());
            // The verified result can disagree with the declared one when
            // the dicrc predates a dictionary rebuild.
            let verified = detect_with_library(&MecabConfigCommand, &library);
            println!("verified charset: {}", verified.charset);
        }
        Err(error) => eprintln!("library unavailable: {error}"),
    }
}
