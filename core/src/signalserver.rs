//! Built-in parameter table for `signalserver` / `signalserverHD`.

use crate::schema::{ParameterSchema, ParameterSpec};
use crate::types::{P2P_DEPENDENCY, ValueKind};

impl ParameterSchema {
    /// Returns the parameter table of the `signalserver` tool.
    ///
    /// # Examples
    ///
    /// ```
    /// use sigplot_core::{ParamGroup, ParameterSchema, validate_schema};
    ///
    /// let schema = ParameterSchema::signalserver();
    /// assert!(validate_schema(&schema).is_empty());
    ///
    /// let hp = schema.find(ParamGroup::Station, "polarization").unwrap();
    /// assert_eq!(hp.flag.as_deref(), Some("-hp"));
    /// ```
    pub fn signalserver() -> Self {
        Self {
            global: global_specs(),
            plot: plot_specs(),
            antenna: antenna_specs(),
            station: station_specs(),
        }
    }
}

fn global_specs() -> Vec<ParameterSpec> {
    use ValueKind::*;
    vec![
        ParameterSpec::switch("terrain_greyscale", "-t")
            .with_hint("Terrain greyscale background"),
        ParameterSpec::switch("debug", "-dbg").with_hint("Verbose debug messages"),
        ParameterSpec::switch("normalize", "-ng")
            .depends_on(&[P2P_DEPENDENCY])
            .with_hint("Normalise path profile graph"),
        ParameterSpec::valued("halve", "-haf", Int).with_hint("Halve 1 or 2 (optional)"),
        ParameterSpec::switch("nothreads", "-nothreads")
            .with_hint("Turn off threaded processing"),
        ParameterSpec::valued("elevation_data_dir", "-sdf", Str)
            .with_hint("Directory containing SRTM derived .sdf DEM tiles (may be .gz or .bz2)"),
        ParameterSpec::valued("lidar_data_dir", "-lid", Str)
            .depends_on(&["use_lidar"])
            .with_hint("ASCII grid tile (LIDAR) with dimensions and resolution defined in header"),
        ParameterSpec::valued("user_data_dir", "-udt", Str)
            .depends_on(&["use_udt"])
            .with_hint("User defined point clutter as decimal coordinates: 'latitude,longitude,height'"),
        ParameterSpec::valued("clutter_data_files", "-clt", Str)
            .with_hint("MODIS 17-class wide area clutter in ASCII grid format"),
    ]
}

fn plot_specs() -> Vec<ParameterSpec> {
    use ValueKind::*;
    vec![
        ParameterSpec::info("id", Int).with_hint("Auto assigned upon creation"),
        ParameterSpec::info("created", Str).with_hint("Auto assigned upon creation"),
        ParameterSpec::info("last_updated", Str).with_hint("Auto update upon modification"),
        ParameterSpec::info("name", Str).with_hint("Must be unique; also names the output files"),
        ParameterSpec::info("antenna_id", Int)
            .with_hint("Antenna profile to use for station 1 and station 2 (required)"),
        ParameterSpec::info("station1_id", Int).with_hint("Transmitter station (required)"),
        ParameterSpec::info("station2_id", Int)
            .with_hint("Receiver station (required for p2p analysis)"),
        ParameterSpec::info(P2P_DEPENDENCY, Bool).with_hint("Also perform point to point analysis"),
        ParameterSpec::switch("use_metric_units", "-m")
            .with_hint("Use metric units in lieu of imperial units for distance measurements"),
        ParameterSpec::info("use_lidar", Bool).with_hint("Include lidar options"),
        ParameterSpec::info("use_udt", Bool).with_hint("Include user data options"),
        ParameterSpec::switch("use_dbm", "-dbm")
            .with_hint("Plot Rxd signal power instead of field strength in dBuV/m"),
        ParameterSpec::switch("use_knife_edge_diffraction", "-ked")
            .with_hint("Knife edge diffraction (already on for ITM)"),
        ParameterSpec::info("opacity", Float).with_hint("Opacity of plot image (0.0-1.0)"),
        ParameterSpec::valued("effective_radiated_power", "-erp", Float).with_hint(
            "Tx total effective radiated power in Watts (dBd) inc Tx+Rx gain. 2.14dBi = 0dBd",
        ),
        ParameterSpec::valued("frequency", "-f", Float)
            .with_hint("Tx frequency (MHz) 20MHz to 100GHz (LOS after 20GHz)"),
        ParameterSpec::valued("radius", "-R", Int)
            .with_hint("Radius (units depend on the 'use_metric_units' option)"),
        ParameterSpec::valued("resolution", "-res", Int)
            .with_hint("Pixels per tile. 300/600/1200/3600 (LIDAR res is within the tile)"),
        ParameterSpec::valued("propagation_model", "-pm", Int).with_hint(
            "Propagation model. 1: ITM, 2: LOS, 3: Hata, 4: ECC33, 5: SUI, 6: COST-Hata, \
             7: FSPL, 8: ITWOM, 9: Ericsson, 10: Plane earth, 11: Egli VHF/UHF, 12: Soil",
        ),
        ParameterSpec::valued("propagation_mode", "-pe", Int)
            .with_hint("Propagation model mode: 1: Urban, 2: Suburban, 3: Rural"),
        ParameterSpec::valued("terrain_code", "-te", Int).with_hint(
            "Terrain code 1-6 (1. Water, 2. Marsh, 3. Farmland, 4. Mountain, 5. Desert, 6. Urban)",
        ),
        ParameterSpec::valued("terrain_dialectric", "-terdic", Float)
            .with_hint("Terrain dielectric value 2-80 (optional)"),
        ParameterSpec::valued("terrain_conductivity", "-tercon", Float)
            .with_hint("Terrain conductivity 0.01-0.0001 (optional)"),
        ParameterSpec::valued("climate_code", "-cl", Int).with_hint(
            "Climate code 1-7 (1. Equatorial 2. Continental subtropical 3. Maritime subtropical \
             4. Desert 5. Continental temperate 6. Maritime temperate (land) \
             7. Maritime temperate (sea))",
        ),
        ParameterSpec::valued("itm_reliability", "-rel", Int)
            .with_hint("Reliability for ITM model (% of 'time') 1 to 99 (default 50%)"),
        ParameterSpec::valued("itm_confidence", "-conf", Int)
            .with_hint("Confidence for ITM model (% of 'situations') 1 to 99 (default 50%)"),
        ParameterSpec::valued("ground_clutter", "-gc", Float)
            .with_hint("Random ground clutter (units depend on the 'use_metric_units' option)"),
        ParameterSpec::valued("resample_reduction_factor", "-resample", Int)
            .depends_on(&["use_lidar"])
            .with_hint("Reduce LIDAR resolution by specified factor (2 : 50%)"),
    ]
}

fn antenna_specs() -> Vec<ParameterSpec> {
    use ValueKind::*;
    vec![
        ParameterSpec::info("id", Int).with_hint("Auto assigned upon creation"),
        ParameterSpec::info("created", Str).with_hint("Auto assigned upon creation"),
        ParameterSpec::info("last_updated", Str).with_hint("Auto update upon modification"),
        ParameterSpec::info("name", Str).with_hint("Must be unique"),
        ParameterSpec::info("type", Str).with_hint("Antenna style"),
        ParameterSpec::valued("rx_gain", "-rxg", Float)
            .depends_on(&[P2P_DEPENDENCY])
            .with_hint("Rx gain dBd (optional for PPA text report)"),
        ParameterSpec::valued("rx_threshhold", "-rt", Float)
            .with_hint("Rx threshold (dB / dBm / dBuV/m)"),
        ParameterSpec::antenna_pattern("filename", "-ant")
            .with_hint("Antenna pattern; .az and .el files must exist beside the .ant name"),
    ]
}

fn station_specs() -> Vec<ParameterSpec> {
    use ValueKind::*;
    vec![
        ParameterSpec::info("id", Int).with_hint("Auto assigned upon creation"),
        ParameterSpec::info("created", Str).with_hint("Auto assigned upon creation"),
        ParameterSpec::info("last_updated", Str).with_hint("Auto update upon modification"),
        ParameterSpec::info("name", Str).with_hint("Must be unique"),
        ParameterSpec::info("geography", Str)
            .with_hint("The country the station physically resides in"),
        ParameterSpec::info("state", Str).with_hint("The state the station physically resides in"),
        ParameterSpec::valued("latitude", "-lat", Float)
            .with_hint("Station latitude (decimal degrees) -70/+70"),
        ParameterSpec::valued("longitude", "-lon", Float)
            .with_hint("Station longitude (decimal degrees) -180/+180"),
        ParameterSpec::valued("height", "-txh", Float).with_hint("Tx height (above ground)"),
        ParameterSpec::valued("polarization", "-hp", Str)
            .when_equals("horizontal")
            .with_hint("Horizontal polarisation (default vertical)"),
        ParameterSpec::valued("rotation", "-rot", Float)
            .with_hint("(0.0 - 359.0 degrees, default 0.0) Antenna pattern rotation"),
        ParameterSpec::valued("downtilt", "-dt", Float)
            .with_hint("(-10.0 - 90.0 degrees, default 0.0) Antenna downtilt"),
        ParameterSpec::valued("downtilt_direction", "-dtdir", Float)
            .with_hint("(0.0 - 359.0 degrees, default 0.0) Antenna downtilt direction"),
        ParameterSpec::valued("rx_height", "-rxh", Float)
            .depends_on(&[P2P_DEPENDENCY])
            .with_hint("Rx height above ground (default 1)"),
        ParameterSpec::valued("rx_latitude", "-rla", Float)
            .depends_on(&[P2P_DEPENDENCY])
            .with_hint("Rx latitude for PPA (decimal degrees) -70/+70"),
        ParameterSpec::valued("rx_longitude", "-rlo", Float)
            .depends_on(&[P2P_DEPENDENCY])
            .with_hint("Rx longitude for PPA (decimal degrees) -180/+180"),
    ]
}
