//! Built-in Cuban salsa (casino) graph.
//!
//! Used whenever no `--graph` file is given. Start beats follow the usual
//! casino counting: most figures out of guapea are led on 7 of the previous
//! cycle, while tension-based leads happen on 1.

use crate::graph::{GraphBuilder, GraphModel};
use anyhow::Result;

pub const GUAPEA: &str = "Guapea position";
pub const CLOSED: &str = "Closed position";
pub const SUELTA: &str = "Suelta position";

const SIETE: &str = "Siete";
const DILE_QUE_SI: &str = "Dile Que Si";
const EL_CAMINO: &str = "El Camino";
const PRIMA_CON_LA_HERMANA: &str = "Prima Con La Hermana";
const EL_UNO: &str = "El Uno";
const KENTUCKY: &str = "Kentucky";
const VACILALA: &str = "Vacilala";
const VACILALA_CON_LA_MANO: &str = "Vacilala Con La Mano";
const VUELTA: &str = "Vuelta";
const OCHO: &str = "Ocho";
const ENCHUFALA: &str = "Enchufala";
const DOBLE: &str = "Doble";
const COMPLICADO: &str = "Complicado";
const DILE_QUE_NO_START: &str = "Dile Que No Start";
const VAMOS_ABAJO: &str = "Vamos Abajo";
const TARRO_DE_MENTIRA: &str = "Tarro De Mentira";
const EXHIBALA: &str = "Exhibala";

/// Build the default salsa graph.
pub fn salsa_graph() -> Result<GraphModel> {
    let mut b = GraphBuilder::new();

    for position in [GUAPEA, CLOSED, SUELTA] {
        b.add_position(position)?;
    }

    for (name, beats) in [
        (SIETE, 8),
        (DILE_QUE_SI, 8),
        (EL_CAMINO, 8),
        (PRIMA_CON_LA_HERMANA, 8),
        (EL_UNO, 24),
        (KENTUCKY, 16),
        (VACILALA, 4), // without la mano
        (VACILALA_CON_LA_MANO, 4),
        (VUELTA, 8),
        (OCHO, 4),
        (ENCHUFALA, 4),
        (DOBLE, 4),
        (COMPLICADO, 4),
        (DILE_QUE_NO_START, 3),
        (VAMOS_ABAJO, 5),
        (TARRO_DE_MENTIRA, 8),
        (EXHIBALA, 8),
    ] {
        b.add_move(name, beats)?;
    }

    // Out of guapea, led on 7
    b.lead(GUAPEA, 7, "?", 2, SIETE)?;
    b.resolves_to(SIETE, GUAPEA, 0)?;
    b.lead(GUAPEA, 7, "Transfer to right hand", 2, EL_UNO)?;
    b.resolves_to(EL_UNO, DILE_QUE_NO_START, 0)?;
    b.lead(GUAPEA, 7, "Hold both hands", 2, KENTUCKY)?;
    b.resolves_to(KENTUCKY, DILE_QUE_NO_START, 0)?;
    b.lead(GUAPEA, 7, "Pull hand then release (with spin)", 2, VACILALA)?;
    b.signal(VACILALA, "Hands not touching", 4, SUELTA)?;
    b.signal(VACILALA, "Right hand on back", 4, DILE_QUE_NO_START)?;
    b.lead(GUAPEA, 7, "Pull hand then raise", 2, VACILALA_CON_LA_MANO)?;
    b.signal(VACILALA_CON_LA_MANO, "Switch places", 4, ENCHUFALA)?;
    b.signal(VACILALA_CON_LA_MANO, "Right hand on back", 4, DILE_QUE_NO_START)?;
    b.lead(GUAPEA, 7, "Foot and hand to the right", 2, OCHO)?;
    b.resolves_to(OCHO, GUAPEA, 4)?;
    b.lead(GUAPEA, 7, "Pull hand", 2, PRIMA_CON_LA_HERMANA)?;
    b.resolves_to(PRIMA_CON_LA_HERMANA, ENCHUFALA, 0)?;

    // Out of guapea, led on 1
    b.lead(GUAPEA, 1, "Tension", 0, ENCHUFALA)?;
    b.signal(ENCHUFALA, "Touch shoulder with right hand", 0, DOBLE)?;
    b.resolves_to(DOBLE, ENCHUFALA, 0)?;
    b.signal(ENCHUFALA, "Take left hand with right", 0, COMPLICADO)?;
    b.resolves_to(COMPLICADO, ENCHUFALA, 0)?;
    b.signal(ENCHUFALA, "Complete", 4, CLOSED)?;
    b.signal(ENCHUFALA, "Hook turn", 4, CLOSED)?;
    b.lead(GUAPEA, 1, "Raise left hand", 0, VUELTA)?;
    b.resolves_to(VUELTA, ENCHUFALA, 0)?;
    b.lead(
        GUAPEA,
        1,
        "Take left hand with right, turn through left shoulder",
        0,
        EL_CAMINO,
    )?;
    b.resolves_to(EL_CAMINO, GUAPEA, 0)?;
    b.lead(GUAPEA, 1, "Make way", 0, DILE_QUE_SI)?;
    b.resolves_to(DILE_QUE_SI, CLOSED, 0)?;

    // Closed position
    b.lead(CLOSED, 1, "Step forward", 0, DILE_QUE_NO_START)?;
    b.signal(DILE_QUE_NO_START, "Turn partner to the left and raise hand", 0, VAMOS_ABAJO)?;
    b.resolves_to(VAMOS_ABAJO, CLOSED, 0)?;
    b.signal(DILE_QUE_NO_START, "Make way", 5, GUAPEA)?;
    b.lead(CLOSED, 5, "Lower left hand, then go forward", 4, TARRO_DE_MENTIRA)?;
    b.resolves_to(TARRO_DE_MENTIRA, CLOSED, 0)?;
    b.lead(CLOSED, 7, "Turn upper body of partner", 2, EXHIBALA)?;
    b.resolves_to(EXHIBALA, CLOSED, 0)?;

    // Suelta
    b.lead(SUELTA, 7, "Hand on back", 2, DILE_QUE_NO_START)?;
    b.lead(SUELTA, 7, "No hand on back", 2, SUELTA)?;

    Ok(b.build())
}
